//! Common Errors

/// Generic error type for the Common Module
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error when reading from or writing to the filesystem
    #[error("Filesystem error: {0}")]
    FilesystemError(#[from] std::io::Error),
    /// Error when serializing or deserializing JSON data
    #[error("Json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    /// Error when parsing data
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Eyre(#[from] eyre::Report),
}
