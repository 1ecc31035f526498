use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub rows: u32,
    pub cols: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub solver_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecPayload {
    pub name: String,
    pub size: u32,
    pub block: Block,
    pub alphabet: Vec<String>,
    pub limits: Limits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoding {
    pub kind: String,
    pub alphabet: String,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            kind: "row-major-string".to_string(),
            alphabet: "as-in-spec".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteGridPayload {
    pub encoding: Encoding,
    pub grid: String,
    pub canonical_hash: String,
}

/// Reason a solver stopped short of a definitive uniqueness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cutoff {
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "SECOND_SOLUTION_FOUND")]
    SecondSolutionFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerdictPayload {
    pub unique: bool,
    pub time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cutoff: Option<Cutoff>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub candidate_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub solved_ref: Option<String>,
    /// Backtracking depth reached; consumed by the shadow guardrail (spec.md §4.7.4).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bt_depth: Option<u64>,
    /// Ordered solve-step trace; compared (not equality-hashed) by the shadow classifier.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace: Option<serde_json::Value>,
    /// Per-cell candidate sets as emitted by the solver, keyed by cell index.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub candidates: Option<serde_json::Value>,
}

impl VerdictPayload {
    /// Exactly one of `candidate_ref`/`solved_ref` must be set (spec.md §3.2, P4).
    pub fn has_valid_ref_xor(&self) -> bool {
        self.candidate_ref.is_some() ^ self.solved_ref.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inputs {
    pub complete_ref: String,
    pub verdict_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub format: String,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderMeta {
    pub page: String,
    pub dpi: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundlePayload {
    pub inputs: Inputs,
    pub target: Target,
    pub render_meta: RenderMeta,
}
