//! `sudoku-pipeline` — a deterministic, content-addressed Sudoku puzzle
//! pipeline with a shadow-compare harness between two solver
//! implementations. The pipeline mechanics (codec, store, validation,
//! router, orchestrator, shadow runtime, event log) live in their own
//! `sudoku-*` crates under `crates/`; this crate is the CLI binding over
//! them.

pub mod cli;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;

pub use config::{Config, ConfigSource};
pub use error::PipelineError;
pub use exit_codes::ExitCode;
