//! Error types for the homework watcher

/// Errors that can occur in the homework watcher
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to the status API failed: {0}")]
    Transport(String),

    #[error("Status API returned HTTP {status}, expected 200")]
    UnexpectedStatus { status: u16 },

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("Empty API response: {0}")]
    EmptyResponse(String),

    #[error("Homework record has no field '{0}'")]
    MissingField(&'static str),

    #[error("Unexpected homework status: {0}")]
    UnknownStatus(String),

    #[error("Notifier error: {0}")]
    Notifier(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for homework watcher operations
pub type Result<T> = std::result::Result<T, WatcherError>;
