use sudoku_contracts::{SpecPayload, VerdictPayload};

use crate::error::PortError;
use crate::grid::{is_latin_and_boxed, validate_complete};
use crate::traits::SolverPort;

use super::synthetic_time_ms;

/// Exhaustive row/column/box check over the whole grid, no pruning, no
/// per-cell bookkeeping retained.
pub struct LegacySolver;

impl SolverPort for LegacySolver {
    fn check_uniqueness(&self, spec: &SpecPayload, grid: &str, seed: &str) -> Result<VerdictPayload, PortError> {
        validate_complete(spec, grid)?;
        let unique = is_latin_and_boxed(spec, grid);

        Ok(VerdictPayload {
            unique,
            time_ms: synthetic_time_ms(seed, "legacy"),
            nodes: Some((spec.size as u64) * (spec.size as u64)),
            cutoff: None,
            candidate_ref: None,
            solved_ref: None,
            bt_depth: Some(0),
            trace: None,
            candidates: None,
        })
    }
}
