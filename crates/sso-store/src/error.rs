//! Error types for the store module.

use sso_core::RecordId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Field bag serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record to update no longer exists.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Another record already holds this unique identity.
    #[error("{field} {value:?} already belongs to another user")]
    Conflict { field: String, value: String },

    /// Record failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Background task failed.
    #[error("store task failed: {0}")]
    Task(String),

    /// A lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Task(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
