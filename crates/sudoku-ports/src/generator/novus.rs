use sudoku_contracts::SpecPayload;

use crate::error::PortError;
use crate::grid::{derive_permutation, permute_bands, remap_grid, BASE_GRID_9X9};
use crate::traits::{GeneratedGrid, GeneratorPort};

use super::natural_alphabet_9;

/// Like [`super::LegacyGenerator`], plus a row-band reordering — a second,
/// independent puzzle family sharing the same baked solution.
pub struct NovusGenerator;

impl GeneratorPort for NovusGenerator {
    fn generate(&self, spec: &SpecPayload, seed: &str) -> Result<GeneratedGrid, PortError> {
        let natural = natural_alphabet_9();
        let target = derive_permutation(&spec.alphabet, seed, "novus-symbols");
        let relabeled = remap_grid(BASE_GRID_9X9, &natural, &target);

        let band_seed = derive_permutation(&["0".into(), "1".into(), "2".into()], seed, "novus-bands");
        let mut band_order: Vec<usize> = band_seed
            .iter()
            .map(|s| s.parse::<usize>().unwrap_or(0))
            .collect();
        band_order.truncate(3);

        let grid = permute_bands(&relabeled, spec.size as usize, spec.block.rows as usize, &band_order);
        Ok(GeneratedGrid { grid })
    }
}
