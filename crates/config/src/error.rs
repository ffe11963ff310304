//! Configuration errors

/// Errors raised while reading, writing or updating the configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file could not be located, read or written
    #[error("Error: {0}")]
    Generic(String),

    /// The configuration file, or a value for one of its keys, is malformed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The key is not a configuration key
    #[error("invalid key: '{0}' is not a valid configuration key.")]
    UnknownKey(String),
}
