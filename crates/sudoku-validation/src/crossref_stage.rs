use serde_json::Value;
use sudoku_contracts::{expected_parent_types, ArtifactType};

use crate::issue::Issue;
use crate::Resolver;

/// Stage 3: resolves cross-artifact references through `resolver` and checks
/// referenced types and shared `spec_ref` lineage.
pub fn run(value: &Value, artifact_type: ArtifactType, resolver: &Resolver) -> Vec<Issue> {
    let mut issues = Vec::new();

    check_parents(value, artifact_type, resolver, &mut issues);

    let own_spec_ref = value.get("spec_ref").and_then(Value::as_str);

    if artifact_type != ArtifactType::Spec {
        if let Some(spec_ref) = own_spec_ref {
            check_ref(spec_ref, ArtifactType::Spec, "$.spec_ref", resolver, &mut issues);
        } else {
            issues.push(Issue::error(
                "crossref.artifact_missing",
                "non-Spec artifacts must carry spec_ref",
                "$.spec_ref",
            ));
        }
    }

    match artifact_type {
        ArtifactType::Verdict => {
            let (ref_field, expected) = if let Some(c) = value.get("candidate_ref").and_then(Value::as_str) {
                (Some(("$.candidate_ref", c)), ArtifactType::CompleteGrid)
            } else if let Some(s) = value.get("solved_ref").and_then(Value::as_str) {
                (Some(("$.solved_ref", s)), ArtifactType::CompleteGrid)
            } else {
                (None, ArtifactType::CompleteGrid)
            };

            if let Some((path, reference)) = ref_field {
                if let Some(resolved) = check_ref(reference, expected, path, resolver, &mut issues) {
                    check_spec_ref_match(&resolved, own_spec_ref, path, &mut issues);
                }
            }
        }
        ArtifactType::ExportBundle => {
            let complete_ref = value.get("inputs").and_then(|i| i.get("complete_ref")).and_then(Value::as_str);
            let verdict_ref = value.get("inputs").and_then(|i| i.get("verdict_ref")).and_then(Value::as_str);

            match complete_ref {
                Some(r) => {
                    if let Some(resolved) = check_ref(r, ArtifactType::CompleteGrid, "$.inputs.complete_ref", resolver, &mut issues) {
                        check_spec_ref_match(&resolved, own_spec_ref, "$.inputs.complete_ref", &mut issues);
                    }
                }
                None => issues.push(Issue::error(
                    "crossref.artifact_missing",
                    "inputs.complete_ref is required",
                    "$.inputs.complete_ref",
                )),
            }

            match verdict_ref {
                Some(r) => {
                    if let Some(resolved) = check_ref(r, ArtifactType::Verdict, "$.inputs.verdict_ref", resolver, &mut issues) {
                        check_spec_ref_match(&resolved, own_spec_ref, "$.inputs.verdict_ref", &mut issues);
                    }
                }
                None => issues.push(Issue::error(
                    "crossref.artifact_missing",
                    "inputs.verdict_ref is required",
                    "$.inputs.verdict_ref",
                )),
            }
        }
        _ => {}
    }

    issues
}

/// Walks `$.parents` against the DAG positions `expected_parent_types`
/// prescribes for `artifact_type`, so an artifact built with the wrong
/// count, order, or resolved type of parent is rejected, not just one
/// whose parent ids fail to resolve at all.
fn check_parents(value: &Value, artifact_type: ArtifactType, resolver: &Resolver, issues: &mut Vec<Issue>) {
    let expected = expected_parent_types(artifact_type);
    let Some(parents) = value.get("parents").and_then(Value::as_array) else {
        return;
    };

    if parents.len() != expected.len() {
        issues.push(Issue::error(
            "crossref.parents_shape",
            format!(
                "{} expects {} parent(s), found {}",
                artifact_type.as_str(),
                expected.len(),
                parents.len()
            ),
            "$.parents",
        ));
        return;
    }

    for (i, (parent, expected_type)) in parents.iter().zip(expected.iter()).enumerate() {
        let Some(parent_id) = parent.as_str() else {
            continue;
        };
        check_ref(parent_id, *expected_type, &format!("$.parents[{i}]"), resolver, issues);
    }
}

fn check_ref(
    reference: &str,
    expected_type: ArtifactType,
    path: &str,
    resolver: &Resolver,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Some(resolved) = resolver(reference) else {
        issues.push(Issue::error(
            "crossref.artifact_missing",
            format!("reference '{reference}' does not resolve to a stored artifact"),
            path.to_string(),
        ));
        return None;
    };

    let actual_type = resolved.get("type").and_then(Value::as_str);
    if actual_type != Some(expected_type.as_str()) {
        issues.push(Issue::error(
            "crossref.type_mismatch",
            format!(
                "reference '{reference}' resolved to type {:?}, expected {}",
                actual_type,
                expected_type.as_str()
            ),
            path.to_string(),
        ));
        return None;
    }

    Some(resolved)
}

fn check_spec_ref_match(resolved: &Value, own_spec_ref: Option<&str>, path: &str, issues: &mut Vec<Issue>) {
    let resolved_spec_ref = resolved.get("spec_ref").and_then(Value::as_str);
    if resolved_spec_ref != own_spec_ref {
        issues.push(Issue::error(
            "crossref.spec_mismatch",
            "referenced artifact does not share spec_ref with this artifact",
            path.to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verdict(parents: Value) -> Value {
        json!({
            "spec_ref": "sha256-spec",
            "candidate_ref": "sha256-complete",
            "parents": parents,
        })
    }

    #[test]
    fn swapped_parent_order_is_a_type_mismatch() {
        let resolver = |r: &str| -> Option<Value> {
            match r {
                "sha256-complete" => Some(json!({"type": "CompleteGrid", "spec_ref": "sha256-spec"})),
                "sha256-spec" => Some(json!({"type": "Spec"})),
                _ => None,
            }
        };
        // Verdict expects [Spec, CompleteGrid]; this artifact swaps them.
        let value = verdict(json!(["sha256-complete", "sha256-spec"]));
        let issues = run(&value, ArtifactType::Verdict, &resolver);
        assert!(issues.iter().any(|i| i.code == "crossref.type_mismatch"));
    }

    #[test]
    fn wrong_parent_count_is_flagged() {
        let resolver = |_: &str| -> Option<Value> { None };
        let value = verdict(json!(["sha256-only-one"]));
        let issues = run(&value, ArtifactType::Verdict, &resolver);
        assert!(issues.iter().any(|i| i.code == "crossref.parents_shape"));
    }

    #[test]
    fn correctly_ordered_parents_pass_the_shape_check() {
        let resolver = |r: &str| -> Option<Value> {
            match r {
                "sha256-spec" => Some(json!({"type": "Spec"})),
                "sha256-complete" => Some(json!({"type": "CompleteGrid", "spec_ref": "sha256-spec"})),
                _ => None,
            }
        };
        let value = verdict(json!(["sha256-spec", "sha256-complete"]));
        let issues = run(&value, ArtifactType::Verdict, &resolver);
        assert!(!issues.iter().any(|i| i.code == "crossref.parents_shape" || i.code == "crossref.type_mismatch"));
    }
}
