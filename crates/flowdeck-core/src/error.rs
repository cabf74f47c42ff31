use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowdeckError {
    // Registry errors
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Invalid node registry: {0}")]
    InvalidRegistry(String),

    // Backend errors
    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Backend returned status {status}: {body}")]
    BackendStatus { status: u16, body: String },

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowdeckError>;
