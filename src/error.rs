//! Error types for runlog
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// runlog error types
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied a value that cannot name a run, log or column
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Snapshot file does not have the expected step/metric layout
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Run configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Global logging subscriber could not be installed
    #[error("Logging init failed: {0}\nA subscriber is already installed for this process")]
    Logging(String),

    /// A thread panicked while holding a train log lock
    #[error("Train log lock poisoned: {0}\nA recording thread panicked; the in-memory table may be incomplete")]
    LockPoisoned(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
