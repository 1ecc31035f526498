#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Codec(#[from] sudoku_codec::CodecError),
    #[error(transparent)]
    Store(#[from] sudoku_store::StoreError),
    #[error(transparent)]
    Router(#[from] sudoku_router::RouterError),
    #[error(transparent)]
    Port(#[from] sudoku_ports::PortError),
    #[error(transparent)]
    EventLog(#[from] sudoku_eventlog::EventLogError),
    #[error("{stage} produced an artifact that failed validation: {report:?}")]
    Validation {
        stage: &'static str,
        report: sudoku_validation::Report,
    },
    #[error("export gate failed: bundle cross-references did not validate; no PDF was produced")]
    ExportGateFailed {
        report: sudoku_validation::Report,
    },
}
