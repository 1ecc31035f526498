use sudoku_contracts::SpecPayload;

use crate::error::PortError;
use crate::grid::{derive_permutation, remap_grid, BASE_GRID_9X9};
use crate::traits::{GeneratedGrid, GeneratorPort};

use super::natural_alphabet_9;

/// Deterministic permutation of a single baked Latin-square solution:
/// relabels symbols only, one fixed grid family per seed.
pub struct LegacyGenerator;

impl GeneratorPort for LegacyGenerator {
    fn generate(&self, spec: &SpecPayload, seed: &str) -> Result<GeneratedGrid, PortError> {
        let natural = natural_alphabet_9();
        let target = derive_permutation(&spec.alphabet, seed, "legacy-symbols");
        let grid = remap_grid(BASE_GRID_9X9, &natural, &target);
        Ok(GeneratedGrid { grid })
    }
}
