//! Validation center (C4): schema, invariant, and cross-reference checks
//! over artifact JSON, driven by a severity profile.

mod crossref_stage;
mod invariant_stage;
pub mod issue;
mod profile;
mod schema_stage;

pub use issue::{assert_valid, Issue, Report, Severity, Timings, ValidationFailed};
pub use profile::{Profile, ProfileConfig};

use std::time::Instant;

use serde_json::Value;
use sudoku_contracts::{ArtifactType, Catalog};

/// Resolves a reference string (content id or path) to the JSON of the
/// artifact it names, or `None` if it can't be found. Borrowed for the
/// duration of one `validate` call; never retained.
pub type Resolver<'a> = dyn Fn(&str) -> Option<Value> + 'a;

/// Run the full validation pipeline over `value`, expecting it to be an
/// artifact of `expect_type`, under `profile`'s stage toggles and severity
/// remaps. `catalog`, if given, backs the schema-identity checks.
pub fn validate(
    value: &Value,
    expect_type: ArtifactType,
    profile: &ProfileConfig,
    resolver: &Resolver,
    catalog: Option<&Catalog>,
) -> Report {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut timings = Timings::default();

    if profile.check_schema {
        let start = Instant::now();
        for issue in schema_stage::run(value, expect_type, catalog) {
            bucket(issue, &mut errors, &mut warnings);
        }
        timings.schema_ms = start.elapsed().as_millis() as u64;
    }

    if profile.check_invariants {
        let start = Instant::now();
        for issue in invariant_stage::run(value, expect_type, profile, resolver) {
            bucket(issue, &mut errors, &mut warnings);
        }
        timings.invariants_ms = start.elapsed().as_millis() as u64;
    }

    if profile.check_crossrefs {
        let start = Instant::now();
        for issue in crossref_stage::run(value, expect_type, resolver) {
            bucket(issue, &mut errors, &mut warnings);
        }
        timings.crossrefs_ms = start.elapsed().as_millis() as u64;
    }

    Report {
        ok: errors.is_empty(),
        errors,
        warnings,
        timings,
    }
}

fn bucket(issue: Issue, errors: &mut Vec<Issue>, warnings: &mut Vec<Issue>) {
    match issue.severity {
        Severity::Error => errors.push(issue),
        Severity::Warn => warnings.push(issue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_spec() -> Value {
        json!({
            "type": "Spec",
            "schema_version": "1.0.0",
            "schema_id": "sudoku.spec.v1",
            "schema_path": "schemas/spec.schema.json",
            "artifact_id": "sha256-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "created_at": "2026-01-01T00:00:00Z",
            "puzzle_type": "sudoku",
            "spec_ref": null,
            "run_id": "run-1",
            "seed": 1,
            "stage": "stage.config.spec",
            "parents": [],
            "metrics": {"time_ms": 0},
            "name": "demo",
            "size": 4,
            "block": {"rows": 2, "cols": 2},
            "alphabet": ["1", "2", "3", "4"],
            "limits": {"solver_timeout_ms": 1000}
        })
    }

    fn no_op_resolver(_: &str) -> Option<Value> {
        None
    }

    #[test]
    fn valid_spec_passes_dev_profile() {
        let profile = ProfileConfig::for_profile(Profile::Dev);
        let report = validate(&valid_spec(), ArtifactType::Spec, &profile, &no_op_resolver, None);
        assert!(report.ok, "{:?}", report.errors);
    }

    #[test]
    fn type_mismatch_is_flagged() {
        let profile = ProfileConfig::for_profile(Profile::Dev);
        let report = validate(&valid_spec(), ArtifactType::Verdict, &profile, &no_op_resolver, None);
        assert!(!report.ok);
        assert!(report.errors.iter().any(|i| i.code == "type.mismatch"));
    }

    #[test]
    fn size_invariant_violation_is_flagged() {
        let mut spec = valid_spec();
        spec["size"] = json!(5);
        let profile = ProfileConfig::for_profile(Profile::Dev);
        let report = validate(&spec, ArtifactType::Spec, &profile, &no_op_resolver, None);
        assert!(report.errors.iter().any(|i| i.code == "invariant.spec.size"));
    }

    #[test]
    fn prod_profile_demotes_cutoff_severity() {
        let verdict = json!({
            "type": "Verdict",
            "schema_version": "1.0.0",
            "schema_id": "sudoku.verdict.v1",
            "schema_path": "schemas/verdict.schema.json",
            "artifact_id": "sha256-bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
            "created_at": "2026-01-01T00:00:00Z",
            "puzzle_type": "sudoku",
            "spec_ref": "sha256-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "run_id": "run-1",
            "seed": 1,
            "stage": "stage.solve.verify",
            "parents": ["sha256-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"],
            "metrics": {"time_ms": 0},
            "unique": true,
            "time_ms": 5,
            "candidate_ref": "sha256-cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
            "cutoff": "NOT_A_REAL_CUTOFF"
        });
        let resolver = |r: &str| -> Option<Value> {
            if r.starts_with("sha256-aaaa") {
                Some(valid_spec())
            } else {
                None
            }
        };
        let profile = ProfileConfig::for_profile(Profile::Prod);
        let report = validate(&verdict, ArtifactType::Verdict, &profile, &resolver, None);
        let cutoff_issue = report
            .warnings
            .iter()
            .chain(report.errors.iter())
            .find(|i| i.code == "verdict.cutoff.invalid")
            .expect("cutoff issue present");
        assert_eq!(cutoff_issue.severity, Severity::Warn);
    }

    #[test]
    fn xor_violation_when_both_refs_set() {
        let verdict = json!({
            "type": "Verdict",
            "schema_version": "1.0.0",
            "schema_id": "sudoku.verdict.v1",
            "schema_path": "schemas/verdict.schema.json",
            "artifact_id": "sha256-dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd",
            "created_at": "2026-01-01T00:00:00Z",
            "puzzle_type": "sudoku",
            "spec_ref": "sha256-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "run_id": "run-1",
            "seed": 1,
            "stage": "stage.solve.verify",
            "parents": [],
            "metrics": {"time_ms": 0},
            "unique": true,
            "time_ms": 5,
            "candidate_ref": "sha256-cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
            "solved_ref": "sha256-eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
        });
        let profile = ProfileConfig::for_profile(Profile::Dev);
        let report = validate(&verdict, ArtifactType::Verdict, &profile, &no_op_resolver, None);
        assert!(report
            .errors
            .iter()
            .any(|i| i.code == "verdict.input_ref.xor_violation"));
    }
}
