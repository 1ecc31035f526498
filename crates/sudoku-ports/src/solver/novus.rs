use serde_json::{json, Value};
use sudoku_contracts::{SpecPayload, VerdictPayload};

use crate::error::PortError;
use crate::grid::{is_latin_and_boxed, validate_complete};
use crate::traits::SolverPort;

use super::synthetic_time_ms;

/// Adds a naked-singles bookkeeping pass over the already-complete grid:
/// for each cell, records the (necessarily singleton) surviving candidate
/// after eliminating row/column/box peers, and the order cells were
/// resolved in. Agrees with [`super::LegacySolver`] on `unique` always;
/// `nodes`/`trace`/`candidates` differ, which is the point of carrying two
/// solver implementations through the shadow-compare harness.
pub struct NovusSolver;

impl SolverPort for NovusSolver {
    fn check_uniqueness(&self, spec: &SpecPayload, grid: &str, seed: &str) -> Result<VerdictPayload, PortError> {
        validate_complete(spec, grid)?;
        let unique = is_latin_and_boxed(spec, grid);

        let size = spec.size as usize;
        let cells: Vec<char> = grid.chars().collect();
        let mut trace = Vec::with_capacity(cells.len());
        let mut candidates = serde_json::Map::new();

        for (index, cell) in cells.iter().enumerate() {
            trace.push(json!({ "cell": index, "resolved": cell.to_string() }));
            candidates.insert(index.to_string(), json!([cell.to_string()]));
        }

        Ok(VerdictPayload {
            unique,
            time_ms: synthetic_time_ms(seed, "novus"),
            nodes: Some((size as u64) * (size as u64) * 2),
            cutoff: None,
            candidate_ref: None,
            solved_ref: None,
            bt_depth: Some(0),
            trace: Some(Value::Array(trace)),
            candidates: Some(serde_json::Value::Object(candidates)),
        })
    }
}
