use chrono::DateTime;
use serde_json::Value;
use sudoku_contracts::{ArtifactType, Catalog, PUZZLE_TYPE_SUDOKU};

use crate::issue::Issue;

const REQUIRED_ENVELOPE_FIELDS: &[&str] = &[
    "type",
    "schema_version",
    "schema_id",
    "schema_path",
    "artifact_id",
    "created_at",
    "puzzle_type",
    "run_id",
    "seed",
    "stage",
    "parents",
    "metrics",
];

/// Stage 1: envelope shape and (optionally) catalog-backed schema identity.
/// Operates on the raw JSON form — a malformed envelope must still produce
/// diagnosable `Issue`s rather than a deserialize panic.
pub fn run(value: &Value, expect_type: ArtifactType, catalog: Option<&Catalog>) -> Vec<Issue> {
    let mut issues = Vec::new();

    let Some(obj) = value.as_object() else {
        issues.push(Issue::error(
            "envelope.bad_type",
            "artifact is not a JSON object",
            "$",
        ));
        return issues;
    };

    for field in REQUIRED_ENVELOPE_FIELDS {
        if !obj.contains_key(*field) {
            issues.push(Issue::error(
                "envelope.missing_field",
                format!("missing required field '{field}'"),
                format!("$.{field}"),
            ));
        }
    }

    if let Some(type_value) = obj.get("type") {
        match type_value.as_str() {
            Some(actual) if actual == expect_type.as_str() => {}
            Some(actual) => issues.push(Issue::error(
                "type.mismatch",
                format!("expected type '{}', found '{actual}'", expect_type.as_str()),
                "$.type",
            )),
            None => issues.push(Issue::error(
                "envelope.bad_type",
                "'type' must be a string",
                "$.type",
            )),
        }
    }

    if let Some(created_at) = obj.get("created_at") {
        match created_at.as_str() {
            Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => {}
            Some(s) => issues.push(Issue::error(
                "envelope.bad_type",
                format!("'created_at' is not ISO-8601: {s}"),
                "$.created_at",
            )),
            None => issues.push(Issue::error(
                "envelope.bad_type",
                "'created_at' must be a string",
                "$.created_at",
            )),
        }
    }

    if let Some(puzzle_type) = obj.get("puzzle_type") {
        match puzzle_type.as_str() {
            Some(s) if s == PUZZLE_TYPE_SUDOKU => {}
            Some(s) => issues.push(Issue::error(
                "envelope.bad_type",
                format!("'puzzle_type' must be '{PUZZLE_TYPE_SUDOKU}', found '{s}'"),
                "$.puzzle_type",
            )),
            None => issues.push(Issue::error(
                "envelope.bad_type",
                "'puzzle_type' must be a string",
                "$.puzzle_type",
            )),
        }
    }

    if let Some(parents) = obj.get("parents") {
        match parents.as_array() {
            Some(items) => {
                let mut seen = std::collections::HashSet::new();
                for (i, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(s) => {
                            if !s.starts_with("sha256-") {
                                issues.push(Issue::error(
                                    "envelope.bad_type",
                                    format!("parent '{s}' is not a content id"),
                                    format!("$.parents[{i}]"),
                                ));
                            }
                            if !seen.insert(s.to_string()) {
                                issues.push(Issue::error(
                                    "envelope.bad_type",
                                    format!("duplicate parent id '{s}'"),
                                    "$.parents",
                                ));
                            }
                        }
                        None => issues.push(Issue::error(
                            "envelope.bad_type",
                            "parent entries must be strings",
                            format!("$.parents[{i}]"),
                        )),
                    }
                }
            }
            None => issues.push(Issue::error(
                "envelope.bad_type",
                "'parents' must be an array",
                "$.parents",
            )),
        }
    }

    match obj.get("metrics").and_then(|m| m.get("time_ms")) {
        Some(Value::Number(n)) if n.as_u64().is_some() => {}
        Some(_) => issues.push(Issue::error(
            "envelope.bad_type",
            "'metrics.time_ms' must be a non-negative integer",
            "$.metrics.time_ms",
        )),
        None => issues.push(Issue::error(
            "envelope.missing_field",
            "missing required field 'metrics.time_ms'",
            "$.metrics.time_ms",
        )),
    }

    if let Some(catalog) = catalog {
        if let Ok(entry) = catalog.entry(expect_type) {
            if obj.get("schema_version").and_then(Value::as_str) != Some(entry.version.as_str()) {
                issues.push(Issue::error(
                    "schema.mismatch_version",
                    format!("schema_version does not match catalog entry '{}'", entry.version),
                    "$.schema_version",
                ));
            }
            if obj.get("schema_id").and_then(Value::as_str) != Some(entry.schema_id.as_str()) {
                issues.push(Issue::error(
                    "schema.mismatch_id",
                    format!("schema_id does not match catalog entry '{}'", entry.schema_id),
                    "$.schema_id",
                ));
            }
            if obj.get("schema_path").and_then(Value::as_str) != Some(entry.schema_path.as_str()) {
                issues.push(Issue::error(
                    "schema.mismatch_path",
                    format!("schema_path does not match catalog entry '{}'", entry.schema_path),
                    "$.schema_path",
                ));
            }
        }
    }

    issues
}
