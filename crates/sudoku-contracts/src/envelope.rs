use serde::{Deserialize, Serialize};
use std::fmt;

/// The four artifact kinds produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    Spec,
    CompleteGrid,
    Verdict,
    ExportBundle,
}

impl ArtifactType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spec => "Spec",
            Self::CompleteGrid => "CompleteGrid",
            Self::Verdict => "Verdict",
            Self::ExportBundle => "ExportBundle",
        }
    }

    pub const ALL: [ArtifactType; 4] = [
        ArtifactType::Spec,
        ArtifactType::CompleteGrid,
        ArtifactType::Verdict,
        ArtifactType::ExportBundle,
    ];
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seed is either a string or an integer; both forms are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedValue::Int(i) => write!(f, "{i}"),
            SeedValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for SeedValue {
    fn from(value: &str) -> Self {
        SeedValue::Str(value.to_string())
    }
}

impl From<String> for SeedValue {
    fn from(value: String) -> Self {
        SeedValue::Str(value)
    }
}

impl From<i64> for SeedValue {
    fn from(value: i64) -> Self {
        SeedValue::Int(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Metrics {
    pub time_ms: u64,
}

/// Fields mandatory on every artifact, regardless of type (spec.md §3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub schema_version: String,
    pub schema_id: String,
    pub schema_path: String,
    pub artifact_id: String,
    pub created_at: String,
    pub puzzle_type: String,
    pub spec_ref: Option<String>,
    pub run_id: String,
    pub seed: SeedValue,
    pub stage: String,
    pub parents: Vec<String>,
    pub metrics: Metrics,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub ext: serde_json::Map<String, serde_json::Value>,
}

pub const PUZZLE_TYPE_SUDOKU: &str = "sudoku";
