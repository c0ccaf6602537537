//! Common error types for Xicon

use thiserror::Error;

/// Common result type for Xicon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Xicon crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required field missing or malformed payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Name (or derived slug) already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid admin session
    #[error("Unauthorized")]
    Unauthorized,

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("JSON error: {}", err))
    }
}
