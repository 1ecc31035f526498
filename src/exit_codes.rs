//! Exit code constants and error-to-exit-code mapping.
//!
//! | Code | Constant | Meaning |
//! |------|----------|---------|
//! | 0 | `SUCCESS` | Pipeline (or subcommand) completed successfully |
//! | 1 | `VALIDATION` | A validation failure (schema/invariant/crossref) or an I/O/collaborator error |
//! | 2 | `CONFIG` | An argument or configuration error (missing salt in prod, unknown puzzle kind, unknown profile, forbidden router state) |
//!
//! Matches spec.md §6.2/§7: only three outcomes ever reach the process exit
//! status, so validation and "everything else went wrong" share exit code 1.

pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION: i32 = 1;
    pub const CONFIG: i32 = 2;
}

use crate::error::PipelineError;
use sudoku_orchestrator::OrchestratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(codes::SUCCESS);
    pub const VALIDATION: ExitCode = ExitCode(codes::VALIDATION);
    pub const CONFIG: ExitCode = ExitCode(codes::CONFIG);

    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<&PipelineError> for ExitCode {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::Config(_)
            | PipelineError::ConfigRead { .. }
            | PipelineError::ConfigParse { .. }
            | PipelineError::Catalog(_)
            | PipelineError::Router(_) => ExitCode::CONFIG,

            PipelineError::Shadow(_) => ExitCode::CONFIG,

            PipelineError::Orchestrator(inner) => match inner {
                OrchestratorError::Router(_) => ExitCode::CONFIG,
                OrchestratorError::Validation { .. } | OrchestratorError::ExportGateFailed { .. } => {
                    ExitCode::VALIDATION
                }
                OrchestratorError::Codec(_)
                | OrchestratorError::Store(_)
                | OrchestratorError::Port(_)
                | OrchestratorError::EventLog(_) => ExitCode::VALIDATION,
            },

            PipelineError::Io(_) => ExitCode::VALIDATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_constants_match_spec() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::VALIDATION.as_i32(), 1);
        assert_eq!(ExitCode::CONFIG.as_i32(), 2);
    }

    #[test]
    fn config_string_error_maps_to_config_exit_code() {
        let err = PipelineError::Config("missing root_seed".to_string());
        assert_eq!(ExitCode::from(&err), ExitCode::CONFIG);
    }

    #[test]
    fn missing_salt_in_prod_maps_to_config_exit_code() {
        let err = PipelineError::Shadow(sudoku_shadow::ShadowConfigError::MissingSaltInProd);
        assert_eq!(ExitCode::from(&err), ExitCode::CONFIG);
    }

    #[test]
    fn unknown_puzzle_kind_maps_to_config_exit_code() {
        let err = PipelineError::Router(sudoku_router::RouterError::UnknownPuzzle("sudoku-16x16".to_string()));
        assert_eq!(ExitCode::from(&err), ExitCode::CONFIG);
    }

    #[test]
    fn router_error_wrapped_in_orchestrator_still_maps_to_config() {
        let err = PipelineError::Orchestrator(OrchestratorError::Router(
            sudoku_router::RouterError::UnknownPuzzle("sudoku-16x16".to_string()),
        ));
        assert_eq!(ExitCode::from(&err), ExitCode::CONFIG);
    }

    #[test]
    fn export_gate_failure_maps_to_validation_exit_code() {
        let report = sudoku_validation::Report {
            ok: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            timings: sudoku_validation::Timings::default(),
        };
        let err = PipelineError::Orchestrator(OrchestratorError::ExportGateFailed { report });
        assert_eq!(ExitCode::from(&err), ExitCode::VALIDATION);
    }
}
