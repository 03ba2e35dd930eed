//! Error types for sonnet-core

use thiserror::Error;

/// Result type alias using sonnet-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sonnet-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blog not found
    #[error("Blog not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed parent chain hit during a recursive tree walk
    #[error("Cycle detected in parent chain at blog {0}")]
    CycleDetected(String),

    /// Remote mirror could not be reached; retry on the next sync tick
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),
}
