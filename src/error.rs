//! Error types for configuration sources.
//!
//! None of these reach resolver callers: every source boundary turns them
//! into "layer absent" after logging.

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a named source
    #[error("Invalid JSON in {source_name}: {error}")]
    Json {
        source_name: String,
        error: serde_json::Error,
    },

    /// Record source could not be reached
    #[error("Record source unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn json(source_name: impl Into<String>, error: serde_json::Error) -> Self {
        StoreError::Json {
            source_name: source_name.into(),
            error,
        }
    }
}
