//! Analyze Errors

use tandem_common::ether::provider::ProviderError;

/// Generic error type for the Analyze Module
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error when reading blocks from the chain data source
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),
    /// Error when loading a chain snapshot
    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] tandem_common::Error),
    /// Error when loading the configuration
    #[error("Config error: {0}")]
    ConfigError(#[from] tandem_config::error::Error),
    /// Generic error
    #[error("Internal error: {0}")]
    Eyre(#[from] eyre::Report),
}
