//! Error types raised by record store implementations.

use thiserror::Error;

/// Errors surfaced by record store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted record in '{collection}': {reason}")]
    CorruptedRecord { collection: String, reason: String },

    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Json(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
