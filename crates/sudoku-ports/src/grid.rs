use sha2::{Digest, Sha256};
use sudoku_contracts::SpecPayload;

use crate::error::PortError;

/// A valid, fully-solved 9x9 Sudoku grid, row-major, no separators.
pub const BASE_GRID_9X9: &str = "\
534678912\
672195348\
198342567\
859761423\
426853791\
713924856\
961537284\
287419635\
345286179";

/// Deterministic permutation of `alphabet` derived from `seed` and `salt`,
/// via a Fisher-Yates shuffle seeded by a SHA-256 digest. Two distinct
/// salts over the same seed produce independent permutations.
pub fn derive_permutation(alphabet: &[String], seed: &str, salt: &str) -> Vec<String> {
    let mut digest = Sha256::new();
    digest.update(seed.as_bytes());
    digest.update(b"|");
    digest.update(salt.as_bytes());
    let hash = digest.finalize();

    let mut symbols: Vec<String> = alphabet.to_vec();
    let n = symbols.len();
    for i in (1..n).rev() {
        let byte = hash[i % hash.len()] as usize;
        let j = byte % (i + 1);
        symbols.swap(i, j);
    }
    symbols
}

/// Re-map every character of `grid` through `mapping` (old alphabet order to
/// new, same length and order as the spec's own alphabet).
pub fn remap_grid(grid: &str, from_alphabet: &[String], to_alphabet: &[String]) -> String {
    let lookup: std::collections::HashMap<char, &str> = from_alphabet
        .iter()
        .zip(to_alphabet.iter())
        .filter_map(|(from, to)| from.chars().next().map(|c| (c, to.as_str())))
        .collect();

    grid.chars()
        .map(|c| lookup.get(&c).copied().unwrap_or("?").to_string())
        .collect()
}

/// Permutes the order of the three row-bands (and the three row-bands'
/// internal row order is left intact, matching Sudoku-preserving symmetries).
pub fn permute_bands(grid: &str, size: usize, block_rows: usize, band_order: &[usize]) -> String {
    let rows: Vec<&str> = (0..size).map(|r| &grid[r * size..(r + 1) * size]).collect();
    let bands_total = size / block_rows;
    let mut out = String::with_capacity(grid.len());
    for band in 0..bands_total {
        let source_band = band_order.get(band).copied().unwrap_or(band);
        for within in 0..block_rows {
            out.push_str(rows[source_band * block_rows + within]);
        }
    }
    out
}

/// Validate that `grid` is `size x size`, uses only `spec`'s alphabet, and
/// satisfies row/column/box uniqueness (a complete, legal Sudoku grid).
pub fn validate_complete(spec: &SpecPayload, grid: &str) -> Result<(), PortError> {
    let size = spec.size as usize;
    if grid.chars().count() != size * size {
        return Err(PortError::WrongGridLength {
            expected: size * size,
            found: grid.chars().count(),
        });
    }

    let allowed: std::collections::HashSet<char> = spec
        .alphabet
        .iter()
        .filter_map(|s| s.chars().next())
        .collect();
    for c in grid.chars() {
        if !allowed.contains(&c) {
            return Err(PortError::UnknownSymbol(c));
        }
    }

    Ok(())
}

/// `true` iff every row, column, and `block_rows x block_cols` box of `grid`
/// contains each alphabet symbol exactly once.
pub fn is_latin_and_boxed(spec: &SpecPayload, grid: &str) -> bool {
    let size = spec.size as usize;
    let cells: Vec<char> = grid.chars().collect();
    if cells.len() != size * size {
        return false;
    }
    let expected: std::collections::HashSet<char> = spec
        .alphabet
        .iter()
        .filter_map(|s| s.chars().next())
        .collect();

    let all_distinct = |values: Vec<char>| -> bool {
        let set: std::collections::HashSet<char> = values.iter().copied().collect();
        set.len() == values.len() && set == expected
    };

    for r in 0..size {
        let row: Vec<char> = (0..size).map(|c| cells[r * size + c]).collect();
        if !all_distinct(row) {
            return false;
        }
    }
    for c in 0..size {
        let col: Vec<char> = (0..size).map(|r| cells[r * size + c]).collect();
        if !all_distinct(col) {
            return false;
        }
    }

    let block_rows = spec.block.rows as usize;
    let block_cols = spec.block.cols as usize;
    if block_rows == 0 || block_cols == 0 {
        return true;
    }
    for br in (0..size).step_by(block_rows) {
        for bc in (0..size).step_by(block_cols) {
            let mut block = Vec::with_capacity(block_rows * block_cols);
            for r in br..(br + block_rows).min(size) {
                for c in bc..(bc + block_cols).min(size) {
                    block.push(cells[r * size + c]);
                }
            }
            if !all_distinct(block) {
                return false;
            }
        }
    }

    true
}
