use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Document store error: {0}")]
    StoreError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No matches recorded yet")]
    NoMatches,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
