/// Error type for the Core module
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error when serializing or deserializing JSON data
    #[error("Json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    /// Error from the analyze module
    #[error("Analyze error: {0}")]
    AnalyzeError(#[from] tandem_analyze::Error),
    /// Error from the cfg module
    #[error("Cfg error: {0}")]
    CfgError(#[from] tandem_cfg::Error),
    /// Generic error with a message
    #[error("Error: {0}")]
    Generic(String),
}
