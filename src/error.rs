use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunLensError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Pipeline run {0} is missing its pipeline name")]
    MissingRunIdentity(u64),

    #[error("Pipeline run {0} has neither a start nor a creation timestamp")]
    MissingRunStart(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunLensError>;
