//! Error types for snapshot and log persistence.

use thiserror::Error;

/// Errors that can occur while writing the state file or the event log.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("persistence task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Alias for `Result<T, PersistError>`.
pub type PersistResult<T> = Result<T, PersistError>;
