//! CFG Errors

use tandem_vm::core::vm::AbortReason;

/// Generic error type for the CFG Module
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error when reading the target bytecode
    #[error("Target error: {0}")]
    TargetError(String),
    /// Error when the bytecode could not be explored
    #[error("Exploration error: {0}")]
    ExplorationError(#[from] AbortReason),
    /// Error when loading the configuration
    #[error("Config error: {0}")]
    ConfigError(#[from] tandem_config::error::Error),
    /// Generic error
    #[error("Internal error: {0}")]
    Eyre(#[from] eyre::Report),
}
