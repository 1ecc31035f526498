use serde_json::Value;
use sudoku_contracts::VerdictPayload;

use crate::classify::{self, Comparison, Taxonomy};
use crate::config::ShadowConfig;
use crate::event::{self, EventContext, GuardrailFields, ShadowEvent};
use crate::sampling;

/// What the candidate (primary) solver produced, paired with the grid it
/// was run against — the shadow runtime never re-solves, it only compares.
pub struct CandidateRun<'a> {
    pub verdict: &'a VerdictPayload,
    pub grid: &'a str,
}

/// What the baseline (secondary) solver produced, lazily supplied only when
/// sampling selects this run.
pub struct BaselineRun {
    pub verdict: VerdictPayload,
    pub grid: String,
}

/// Counter deltas the orchestrator folds into its run summary.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub shadow_skipped: u64,
    pub shadow_ok: u64,
    pub shadow_mismatch: Vec<&'static str>,
}

pub struct RunOutcome {
    pub sampled: bool,
    pub fallback_used: bool,
    pub taxonomy: Option<Taxonomy>,
    pub event: Option<ShadowEvent>,
    pub counters: Counters,
    /// The baseline run, present whenever sampling selected this invocation.
    /// Callers consult this when `fallback_used` is set (spec.md §4.7.5):
    /// the baseline's verdict, not the candidate's, becomes the record of
    /// truth.
    pub baseline: Option<BaselineRun>,
}

#[allow(clippy::too_many_arguments)]
pub fn run<F, E>(
    config: &ShadowConfig,
    run_id: &str,
    puzzle_digest: &str,
    alphabet: &[String],
    candidate: &CandidateRun<'_>,
    candidate_artifact_value: &Value,
    ctx_stub: &EventContext<'_>,
    allow_fallback: bool,
    baseline_thunk: F,
) -> RunOutcome
where
    F: FnOnce() -> Result<BaselineRun, E>,
    E: std::fmt::Display,
{
    if !config.enabled {
        return RunOutcome {
            sampled: false,
            fallback_used: false,
            taxonomy: None,
            event: None,
            counters: Counters {
                shadow_skipped: 1,
                ..Counters::default()
            },
            baseline: None,
        };
    }

    let hash_salt = config.hash_salt.as_deref().unwrap_or("");
    let sampled = sampling::sample_hit(&config.sample_rate, hash_salt, config.sticky, run_id, puzzle_digest);

    if !sampled {
        return RunOutcome {
            sampled: false,
            fallback_used: false,
            taxonomy: None,
            event: None,
            counters: Counters {
                shadow_skipped: 1,
                ..Counters::default()
            },
            baseline: None,
        };
    }

    let baseline = match baseline_thunk() {
        Ok(baseline) => baseline,
        Err(err) => {
            let taxonomy = Taxonomy::baseline_error(format!("baseline solver raised: {err}"));
            let mut counters = Counters::default();
            counters.shadow_mismatch.push(taxonomy.code);
            let event = if config.log_mismatch {
                Some(event::build_event(
                    ctx_stub,
                    candidate.verdict,
                    candidate.verdict,
                    candidate.grid,
                    alphabet,
                    candidate_artifact_value,
                    Some(&taxonomy),
                    None,
                ))
            } else {
                None
            };
            return RunOutcome {
                sampled: true,
                fallback_used: false,
                taxonomy: Some(taxonomy),
                event,
                counters,
                baseline: None,
            };
        }
    };

    let guardrail = classify::classify_guardrail(&baseline.verdict);
    let taxonomy = guardrail.clone().unwrap_or_else(|| {
        classify::classify(&Comparison {
            baseline: &baseline.verdict,
            candidate: candidate.verdict,
            baseline_grid: &baseline.grid,
            candidate_grid: candidate.grid,
        })
    });

    let guardrail_fields = guardrail.as_ref().map(|g| GuardrailFields {
        nodes: baseline.verdict.nodes,
        bt_depth: baseline.verdict.bt_depth,
        time_ms: baseline.verdict.time_ms,
        limit_hit: g.reason.clone(),
    });

    let fallback_used = allow_fallback && taxonomy.severity == classify::Severity::Critical;

    let mut counters = Counters::default();
    if taxonomy.is_match() {
        counters.shadow_ok = 1;
    } else {
        counters.shadow_mismatch.push(taxonomy.code);
    }

    let should_log = !taxonomy.is_match() || guardrail_fields.is_some();
    let event = if config.log_mismatch && should_log {
        Some(event::build_event(
            ctx_stub,
            candidate.verdict,
            &baseline.verdict,
            candidate.grid,
            alphabet,
            candidate_artifact_value,
            Some(&taxonomy),
            guardrail_fields,
        ))
    } else {
        None
    };

    RunOutcome {
        sampled: true,
        fallback_used,
        taxonomy: Some(taxonomy),
        event,
        counters,
        baseline: Some(baseline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, TomlShadowConfig};
    use std::collections::HashMap;

    fn verdict(unique: bool) -> VerdictPayload {
        VerdictPayload {
            unique,
            time_ms: 1,
            solved_ref: Some("sha256-abc".to_string()),
            ..Default::default()
        }
    }

    fn ctx<'a>() -> EventContext<'a> {
        EventContext {
            run_id: "run-1",
            ts_iso8601: "2026-01-01T00:00:00Z",
            commit_sha: "deadbeef",
            baseline_sha: "deadbeef",
            hw_fingerprint: "test-host",
            profile: "dev",
            puzzle_digest: "digest",
            solver_primary: "legacy",
            solver_shadow: "novus",
            sample_rate: "1.0",
        }
    }

    #[test]
    fn disabled_config_always_skips() {
        let toml_config = TomlShadowConfig {
            enabled: Some(false),
            ..Default::default()
        };
        let config = config::resolve("dev", &toml_config, &HashMap::new()).unwrap();
        let candidate_verdict = verdict(true);
        let candidate = CandidateRun {
            verdict: &candidate_verdict,
            grid: "grid",
        };
        let outcome = run(
            &config,
            "run-1",
            "digest",
            &[],
            &candidate,
            &serde_json::json!({}),
            &ctx(),
            true,
            || -> Result<BaselineRun, String> {
                Ok(BaselineRun {
                    verdict: verdict(true),
                    grid: "grid".to_string(),
                })
            },
        );
        assert!(!outcome.sampled);
        assert_eq!(outcome.counters.shadow_skipped, 1);
    }

    #[test]
    fn critical_mismatch_triggers_fallback_when_allowed() {
        let toml_config = TomlShadowConfig {
            enabled: Some(true),
            sample_rate: Some("1.0".to_string()),
            ..Default::default()
        };
        let config = config::resolve("dev", &toml_config, &HashMap::new()).unwrap();
        let candidate_verdict = verdict(true);
        let candidate = CandidateRun {
            verdict: &candidate_verdict,
            grid: "grid-a",
        };
        let outcome = run(
            &config,
            "run-1",
            "digest",
            &[],
            &candidate,
            &serde_json::json!({}),
            &ctx(),
            true,
            || -> Result<BaselineRun, String> {
                Ok(BaselineRun {
                    verdict: verdict(false),
                    grid: "grid-a".to_string(),
                })
            },
        );
        assert!(outcome.sampled);
        assert!(outcome.fallback_used);
        assert_eq!(outcome.taxonomy.unwrap().code, "C1");
        assert!(outcome.event.is_some());
    }

    #[test]
    fn matching_payloads_do_not_emit_an_event() {
        let toml_config = TomlShadowConfig {
            enabled: Some(true),
            sample_rate: Some("1.0".to_string()),
            ..Default::default()
        };
        let config = config::resolve("dev", &toml_config, &HashMap::new()).unwrap();
        let candidate_verdict = verdict(true);
        let candidate = CandidateRun {
            verdict: &candidate_verdict,
            grid: "grid-a",
        };
        let outcome = run(
            &config,
            "run-1",
            "digest",
            &[],
            &candidate,
            &serde_json::json!({}),
            &ctx(),
            true,
            || -> Result<BaselineRun, String> {
                Ok(BaselineRun {
                    verdict: verdict(true),
                    grid: "grid-a".to_string(),
                })
            },
        );
        assert!(outcome.taxonomy.unwrap().is_match());
        assert!(outcome.event.is_none());
        assert_eq!(outcome.counters.shadow_ok, 1);
    }

    #[test]
    fn baseline_solver_error_becomes_c6_minor_and_does_not_propagate() {
        let toml_config = TomlShadowConfig {
            enabled: Some(true),
            sample_rate: Some("1.0".to_string()),
            ..Default::default()
        };
        let config = config::resolve("dev", &toml_config, &HashMap::new()).unwrap();
        let candidate_verdict = verdict(true);
        let candidate = CandidateRun {
            verdict: &candidate_verdict,
            grid: "grid-a",
        };
        let outcome = run(
            &config,
            "run-1",
            "digest",
            &[],
            &candidate,
            &serde_json::json!({}),
            &ctx(),
            true,
            || -> Result<BaselineRun, String> { Err("solver exploded".to_string()) },
        );
        assert!(outcome.sampled);
        assert!(!outcome.fallback_used, "a failed baseline must never win over the candidate");
        assert!(outcome.baseline.is_none());
        let taxonomy = outcome.taxonomy.expect("a taxonomy is always produced");
        assert_eq!(taxonomy.code, "C6");
        assert_eq!(taxonomy.severity, classify::Severity::Minor);
        assert!(outcome.event.is_some());
        assert_eq!(outcome.counters.shadow_mismatch, vec!["C6"]);
    }
}
