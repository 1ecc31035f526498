use serde_json::Value;
use sudoku_contracts::ArtifactType;

use crate::issue::Issue;
use crate::profile::ProfileConfig;
use crate::Resolver;

/// Stage 2: type-specific payload rules, registered by name so profiles can
/// toggle individual rules rather than branching on the artifact type.
pub fn run(
    value: &Value,
    artifact_type: ArtifactType,
    profile: &ProfileConfig,
    resolver: &Resolver,
) -> Vec<Issue> {
    match artifact_type {
        ArtifactType::Spec => spec_rules(value, profile),
        ArtifactType::CompleteGrid => complete_grid_rules(value, profile, resolver),
        ArtifactType::Verdict => verdict_rules(value, profile),
        ArtifactType::ExportBundle => export_bundle_rules(value, profile),
    }
}

fn spec_rules(value: &Value, profile: &ProfileConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    let size = value.get("size").and_then(Value::as_u64);
    let rows = value.get("block").and_then(|b| b.get("rows")).and_then(Value::as_u64);
    let cols = value.get("block").and_then(|b| b.get("cols")).and_then(Value::as_u64);

    if profile.is_invariant_enabled("Spec", "size") {
        match (size, rows, cols) {
            (Some(size), Some(rows), Some(cols)) if size == rows * cols => {}
            _ => issues.push(rule_issue(
                profile,
                "Spec",
                "size",
                "size must equal block.rows * block.cols",
                "$.size",
            )),
        }
    }

    let alphabet = value.get("alphabet").and_then(Value::as_array);

    if profile.is_invariant_enabled("Spec", "alphabet_length") {
        match (alphabet, size) {
            (Some(a), Some(size)) if a.len() as u64 == size => {}
            _ => issues.push(rule_issue(
                profile,
                "Spec",
                "alphabet_length",
                "alphabet length must equal size",
                "$.alphabet",
            )),
        }
    }

    if profile.is_invariant_enabled("Spec", "alphabet_unique") {
        if let Some(a) = alphabet {
            let mut seen = std::collections::HashSet::new();
            let all_unique = a.iter().all(|v| seen.insert(v.as_str().unwrap_or_default()));
            if !all_unique {
                issues.push(rule_issue(
                    profile,
                    "Spec",
                    "alphabet_unique",
                    "alphabet symbols must be unique",
                    "$.alphabet",
                ));
            }
        }
    }

    if profile.is_invariant_enabled("Spec", "timeout") {
        let timeout = value
            .get("limits")
            .and_then(|l| l.get("solver_timeout_ms"));
        match timeout.and_then(Value::as_i64) {
            Some(t) if t >= 0 => {}
            _ => issues.push(rule_issue(
                profile,
                "Spec",
                "timeout",
                "limits.solver_timeout_ms must be a non-negative integer",
                "$.limits.solver_timeout_ms",
            )),
        }
    }

    issues
}

fn complete_grid_rules(value: &Value, profile: &ProfileConfig, resolver: &Resolver) -> Vec<Issue> {
    let mut issues = Vec::new();

    let grid = value.get("grid").and_then(Value::as_str);

    if profile.is_invariant_enabled("CompleteGrid", "encoding") {
        let kind = value.get("encoding").and_then(|e| e.get("kind")).and_then(Value::as_str);
        if kind != Some("row-major-string") {
            issues.push(rule_issue(
                profile,
                "CompleteGrid",
                "encoding",
                "encoding.kind must be 'row-major-string'",
                "$.encoding.kind",
            ));
        }
    }

    let spec = value
        .get("spec_ref")
        .and_then(Value::as_str)
        .and_then(resolver);

    if let Some(spec) = &spec {
        let expected_size = spec.get("size").and_then(Value::as_u64);

        if profile.is_invariant_enabled("CompleteGrid", "grid_length") {
            match (grid, expected_size) {
                (Some(g), Some(size)) if g.chars().count() as u64 == size * size => {}
                _ => issues.push(rule_issue(
                    profile,
                    "CompleteGrid",
                    "grid_length",
                    "grid length must equal size^2",
                    "$.grid",
                )),
            }
        }

        if profile.is_invariant_enabled("CompleteGrid", "symbols") {
            if let (Some(g), Some(alphabet)) = (grid, spec.get("alphabet").and_then(Value::as_array)) {
                let allowed: std::collections::HashSet<String> = alphabet
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                let all_allowed = g.chars().all(|c| allowed.contains(&c.to_string()));
                if !all_allowed {
                    issues.push(rule_issue(
                        profile,
                        "CompleteGrid",
                        "symbols",
                        "grid contains symbols outside the spec alphabet",
                        "$.grid",
                    ));
                }
            }
        }
    }

    if profile.is_invariant_enabled("CompleteGrid", "grid_canonical_hash") {
        if let (Some(g), Some(hash)) = (grid, value.get("canonical_hash").and_then(Value::as_str)) {
            let expected = sudoku_codec::sha256_prefixed(g.as_bytes());
            if expected != hash {
                issues.push(
                    Issue::warn(
                        "invariant.completegrid.grid_canonical_hash",
                        "canonical_hash does not match sha256(grid)",
                        "$.canonical_hash",
                    )
                    .with_severity(profile.remap_severity(
                        "CompleteGrid",
                        "invariant.completegrid.grid_canonical_hash",
                        crate::issue::Severity::Warn,
                    )),
                );
            }
        }
    }

    issues
}

fn verdict_rules(value: &Value, profile: &ProfileConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    let candidate_ref = value.get("candidate_ref").and_then(Value::as_str);
    let solved_ref = value.get("solved_ref").and_then(Value::as_str);

    if candidate_ref.is_some() == solved_ref.is_some() {
        issues.push(rule_issue_exact(
            profile,
            "Verdict",
            "verdict.input_ref.xor_violation",
            "exactly one of candidate_ref/solved_ref must be set",
            "$",
        ));
    }

    if profile.is_invariant_enabled("Verdict", "unique") {
        if value.get("unique").and_then(Value::as_bool).is_none() {
            issues.push(rule_issue(
                profile,
                "Verdict",
                "unique",
                "'unique' must be a boolean",
                "$.unique",
            ));
        }
    }

    let time_ok = matches!(value.get("time_ms").and_then(Value::as_i64), Some(t) if t >= 0);
    if !time_ok {
        issues.push(rule_issue_exact(
            profile,
            "Verdict",
            "verdict.time.invalid",
            "'time_ms' must be a non-negative integer",
            "$.time_ms",
        ));
    }

    if let Some(cutoff) = value.get("cutoff") {
        let valid = matches!(cutoff.as_str(), Some("TIMEOUT") | Some("SECOND_SOLUTION_FOUND"));
        if !valid {
            issues.push(rule_issue_exact(
                profile,
                "Verdict",
                "verdict.cutoff.invalid",
                "'cutoff' must be 'TIMEOUT' or 'SECOND_SOLUTION_FOUND'",
                "$.cutoff",
            ));
        }
    }

    issues
}

fn export_bundle_rules(value: &Value, profile: &ProfileConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    if profile.is_invariant_enabled("ExportBundle", "target_format") {
        let format = value.get("target").and_then(|t| t.get("format")).and_then(Value::as_str);
        if format != Some("pdf") {
            issues.push(rule_issue(
                profile,
                "ExportBundle",
                "target_format",
                "target.format must be 'pdf'",
                "$.target.format",
            ));
        }
    }

    issues
}

fn rule_issue(
    profile: &ProfileConfig,
    artifact_type: &'static str,
    rule: &'static str,
    message: impl Into<String>,
    path: impl Into<String>,
) -> Issue {
    let code = format!("invariant.{}.{rule}", artifact_type.to_lowercase());
    let severity = profile.remap_severity(artifact_type, &code, crate::issue::Severity::Error);
    Issue::error(code, message, path).with_severity(severity)
}

/// Like `rule_issue` but for the taxonomy's special-cased top-level codes
/// (`verdict.input_ref.xor_violation`, `verdict.time.invalid`,
/// `verdict.cutoff.invalid`) that don't follow the `invariant.<type>.<rule>` shape.
fn rule_issue_exact(
    profile: &ProfileConfig,
    artifact_type: &'static str,
    code: &'static str,
    message: impl Into<String>,
    path: impl Into<String>,
) -> Issue {
    let severity = profile.remap_severity(artifact_type, code, crate::issue::Severity::Error);
    Issue::error(code, message, path).with_severity(severity)
}
