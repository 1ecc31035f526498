use std::path::Path;

use sudoku_contracts::{SpecPayload, VerdictPayload};

use crate::error::PortError;

pub struct GeneratedGrid {
    pub grid: String,
}

pub trait GeneratorPort {
    fn generate(&self, spec: &SpecPayload, seed: &str) -> Result<GeneratedGrid, PortError>;
}

pub trait SolverPort {
    fn check_uniqueness(&self, spec: &SpecPayload, grid: &str, seed: &str) -> Result<VerdictPayload, PortError>;
}

pub struct PrinterInput<'a> {
    pub spec: &'a SpecPayload,
    pub grid: &'a str,
}

pub struct PrinterOutput {
    pub path: std::path::PathBuf,
    pub bytes_written: u64,
}

pub trait PrinterPort {
    fn export(&self, input: &PrinterInput<'_>, output_dir: &Path) -> Result<PrinterOutput, PortError>;
}

/// Registered but never invoked by the orchestrator — the role enum exists
/// only so the router's role set matches the source's four roles.
pub trait DifficultyPort {
    fn estimate(&self, spec: &SpecPayload, grid: &str) -> Result<u32, PortError>;
}
