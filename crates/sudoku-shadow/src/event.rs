use serde::Serialize;
use serde_json::Value;
use sudoku_contracts::VerdictPayload;

use crate::classify::Taxonomy;

#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyFields {
    pub code: &'static str,
    pub severity: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuardrailFields {
    pub nodes: Option<u64>,
    pub bt_depth: Option<u64>,
    pub time_ms: u64,
    pub limit_hit: String,
}

/// A `sudoku.shadow_sample.v1` / `sudoku.shadow_mismatch.v1` event
/// (spec.md §4.7.6). Appended to the event log only on mismatch or
/// guardrail breach, per `log_mismatch`.
#[derive(Debug, Clone, Serialize)]
pub struct ShadowEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub run_id: String,
    pub ts_iso8601: String,
    pub commit_sha: String,
    pub baseline_sha: String,
    pub hw_fingerprint: String,
    pub profile: String,
    pub puzzle_digest: String,
    pub solver_primary: String,
    pub solver_shadow: String,
    pub verdict_status: String,
    pub time_ms_primary: u64,
    pub time_ms_shadow: u64,
    pub diff_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved_ref_digest: Option<String>,
    pub sample_rate: String,
    pub solve_trace_sha256: String,
    pub state_hash_sha256: String,
    pub envelope_jcs_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<TaxonomyFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail: Option<GuardrailFields>,
}

pub struct EventContext<'a> {
    pub run_id: &'a str,
    pub ts_iso8601: &'a str,
    pub commit_sha: &'a str,
    pub baseline_sha: &'a str,
    pub hw_fingerprint: &'a str,
    pub profile: &'a str,
    pub puzzle_digest: &'a str,
    pub solver_primary: &'a str,
    pub solver_shadow: &'a str,
    pub sample_rate: &'a str,
}

/// The 9x9 "position fingerprint": `sha256(candidate_bitmap(81x9) ++ grid_bytes(81))`.
/// The bitmap cell for each of the 81 cells is reconstructed from the
/// solver's `candidates` map when present, else from the grid's own digit
/// (a one-hot candidate set), per spec.md §4.7.6.
pub fn compute_state_hash(grid: &str, candidates: Option<&Value>, alphabet: &[String]) -> String {
    const CELLS: usize = 81;
    let symbols = alphabet.len().max(1);
    let mut bitmap = vec![0u8; (CELLS * symbols).div_ceil(8)];

    let grid_chars: Vec<char> = grid.chars().collect();

    for cell in 0..CELLS {
        let mut set_any = false;
        if let Some(cell_candidates) = candidates
            .and_then(|c| c.get(cell.to_string()))
            .and_then(Value::as_array)
        {
            for candidate in cell_candidates {
                if let Some(symbol) = candidate.as_str() {
                    if let Some(position) = alphabet.iter().position(|s| s == symbol) {
                        set_bit(&mut bitmap, cell * symbols + position);
                        set_any = true;
                    }
                }
            }
        }
        if !set_any {
            if let Some(ch) = grid_chars.get(cell) {
                if let Some(position) = alphabet.iter().position(|s| s.chars().next() == Some(*ch)) {
                    set_bit(&mut bitmap, cell * symbols + position);
                }
            }
        }
    }

    let mut hasher_input = bitmap;
    hasher_input.extend_from_slice(grid.as_bytes());
    sudoku_codec::sha256_hex(&hasher_input)
}

fn set_bit(bitmap: &mut [u8], index: usize) {
    bitmap[index / 8] |= 1 << (index % 8);
}

/// The candidate's verdict `solved_ref`/`candidate_ref`, normalised to a
/// bare 64-character hex digest when it is a content id — Open Question #3
/// (spec.md §9) resolved the same way as the source: the artifact id's
/// digest, when one is available.
pub fn solved_ref_digest(verdict: &VerdictPayload) -> Option<String> {
    verdict
        .solved_ref
        .as_deref()
        .map(|r| r.strip_prefix("sha256-").unwrap_or(r).to_string())
}

#[allow(clippy::too_many_arguments)]
pub fn build_event(
    ctx: &EventContext<'_>,
    candidate_verdict: &VerdictPayload,
    baseline_verdict: &VerdictPayload,
    candidate_grid: &str,
    alphabet: &[String],
    candidate_artifact_value: &Value,
    taxonomy: Option<&Taxonomy>,
    guardrail: Option<GuardrailFields>,
) -> ShadowEvent {
    let verdict_status = if guardrail.is_some() {
        "budget_exhausted"
    } else if taxonomy.map(Taxonomy::is_match).unwrap_or(true) {
        "match"
    } else {
        "mismatch"
    };

    let event_type = if verdict_status == "match" {
        "sudoku.shadow_sample.v1"
    } else {
        "sudoku.shadow_mismatch.v1"
    };

    let diff_summary = taxonomy
        .filter(|t| !t.is_match())
        .map(|t| format!("{}:{}", t.code, t.reason))
        .unwrap_or_else(|| "none".to_string());

    let trace_value = candidate_verdict.trace.clone().unwrap_or(Value::Array(vec![]));
    let solve_trace_sha256 = sudoku_codec::canonicalize(&trace_value)
        .map(|bytes| sudoku_codec::sha256_hex(&bytes))
        .unwrap_or_default();

    let envelope_jcs_sha256 = sudoku_codec::canonicalize(candidate_artifact_value)
        .map(|bytes| sudoku_codec::sha256_hex(&bytes))
        .unwrap_or_default();

    let state_hash_sha256 = compute_state_hash(candidate_grid, candidate_verdict.candidates.as_ref(), alphabet);

    ShadowEvent {
        event_type: event_type.to_string(),
        run_id: ctx.run_id.to_string(),
        ts_iso8601: ctx.ts_iso8601.to_string(),
        commit_sha: ctx.commit_sha.to_string(),
        baseline_sha: ctx.baseline_sha.to_string(),
        hw_fingerprint: ctx.hw_fingerprint.to_string(),
        profile: ctx.profile.to_string(),
        puzzle_digest: ctx.puzzle_digest.to_string(),
        solver_primary: ctx.solver_primary.to_string(),
        solver_shadow: ctx.solver_shadow.to_string(),
        verdict_status: verdict_status.to_string(),
        time_ms_primary: candidate_verdict.time_ms,
        time_ms_shadow: baseline_verdict.time_ms,
        diff_summary,
        solved_ref_digest: solved_ref_digest(candidate_verdict),
        sample_rate: ctx.sample_rate.to_string(),
        solve_trace_sha256,
        state_hash_sha256,
        envelope_jcs_sha256,
        taxonomy: taxonomy.filter(|t| !t.is_match()).map(|t| TaxonomyFields {
            code: t.code,
            severity: t.severity.as_str(),
            reason: t.reason.clone(),
        }),
        guardrail,
    }
}
