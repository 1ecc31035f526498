#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("grid has wrong length: expected {expected}, found {found}")]
    WrongGridLength { expected: usize, found: usize },
    #[error("grid contains a symbol outside the spec alphabet: '{0}'")]
    UnknownSymbol(char),
    #[error("I/O error writing export output at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
