//! Error types for SSO Core.

use thiserror::Error;

/// Errors raised while validating or decoding core data.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid peer {name:?}: {reason}")]
    InvalidPeer { name: String, reason: String },

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            CoreError::DecodingError(e.to_string())
        } else {
            CoreError::EncodingError(e.to_string())
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
