//! Aggregate error type for the `sudoku-pipeline` binary.
//!
//! Library crates each carry their own `thiserror` enum (`CodecError`,
//! `StoreError`, `RouterError`, `ShadowConfigError`, `OrchestratorError`, …);
//! this type aggregates the ones that can surface at the CLI boundary so
//! `cli::run()` has a single error to map to an [`crate::exit_codes::ExitCode`].
use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A configuration problem this binary detected itself (missing
    /// required field, unknown profile name) rather than one raised by a
    /// library crate.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path} as TOML: {source}")]
    ConfigParse {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Shadow(#[from] sudoku_shadow::ShadowConfigError),

    #[error(transparent)]
    Router(#[from] sudoku_router::RouterError),

    #[error(transparent)]
    Catalog(#[from] sudoku_contracts::CatalogError),

    #[error(transparent)]
    Orchestrator(#[from] sudoku_orchestrator::OrchestratorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
