//! Generator/solver/printer/difficulty port traits (§6.1) plus `legacy` and
//! `novus` demo implementations under `puzzle_kind = "sudoku-9x9"` (§6.6).
//! The real solver/generator/printer algorithms are out of scope (spec.md
//! §1 Non-goals) — these exist to make the pipeline runnable end-to-end.

mod error;
mod generator;
mod grid;
mod printer;
mod solver;
mod traits;

pub use error::PortError;
pub use generator::{LegacyGenerator, NovusGenerator};
pub use printer::LegacyPrinter;
pub use solver::{LegacySolver, NovusSolver};
pub use traits::{
    DifficultyPort, GeneratedGrid, GeneratorPort, PrinterInput, PrinterOutput, PrinterPort, SolverPort,
};

#[cfg(test)]
mod tests {
    use super::*;
    use sudoku_contracts::{Block, Limits, SpecPayload};

    fn spec_9x9() -> SpecPayload {
        SpecPayload {
            name: "demo".to_string(),
            size: 9,
            block: Block { rows: 3, cols: 3 },
            alphabet: (1..=9).map(|d| d.to_string()).collect(),
            limits: Limits { solver_timeout_ms: 1000 },
        }
    }

    #[test]
    fn legacy_generator_produces_valid_grid() {
        let spec = spec_9x9();
        let grid = LegacyGenerator.generate(&spec, "seed-a").unwrap();
        assert_eq!(grid.grid.chars().count(), 81);
        assert!(grid::is_latin_and_boxed(&spec, &grid.grid));
    }

    #[test]
    fn novus_generator_produces_valid_grid() {
        let spec = spec_9x9();
        let grid = NovusGenerator.generate(&spec, "seed-a").unwrap();
        assert_eq!(grid.grid.chars().count(), 81);
        assert!(grid::is_latin_and_boxed(&spec, &grid.grid));
    }

    #[test]
    fn generators_diverge_across_implementations() {
        let spec = spec_9x9();
        let legacy = LegacyGenerator.generate(&spec, "seed-a").unwrap();
        let novus = NovusGenerator.generate(&spec, "seed-a").unwrap();
        assert_ne!(legacy.grid, novus.grid);
    }

    #[test]
    fn legacy_and_novus_solvers_agree_on_unique_but_not_on_trace() {
        let spec = spec_9x9();
        let grid = LegacyGenerator.generate(&spec, "seed-a").unwrap().grid;
        let legacy_verdict = LegacySolver.check_uniqueness(&spec, &grid, "seed-a").unwrap();
        let novus_verdict = NovusSolver.check_uniqueness(&spec, &grid, "seed-a").unwrap();
        assert_eq!(legacy_verdict.unique, novus_verdict.unique);
        assert!(legacy_verdict.trace.is_none());
        assert!(novus_verdict.trace.is_some());
    }

    #[test]
    fn printer_writes_a_valid_pdf() {
        let spec = spec_9x9();
        let grid = LegacyGenerator.generate(&spec, "seed-a").unwrap().grid;
        let dir = tempfile::tempdir().unwrap();
        let input = PrinterInput { spec: &spec, grid: &grid };
        let output = LegacyPrinter.export(&input, dir.path()).unwrap();
        assert!(output.path.exists());
        assert!(output.bytes_written > 0);
    }
}
