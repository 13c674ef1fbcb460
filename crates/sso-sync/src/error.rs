//! Error types for the sync module.

use thiserror::Error;

/// Errors that can occur during sync operations.
///
/// Inbound errors become HTTP replies (see [`SyncError::status_code`]).
/// Outbound errors never reach the caller of a sync; they are logged and
/// the affected peer or record is dropped from the result.
#[derive(Debug, Error)]
pub enum SyncError {
    /// This node has no peers configured.
    #[error("no sync configured")]
    NotConfigured,

    /// Missing or unknown shared secret.
    #[error("not authorized")]
    NotAuthorized,

    /// Request body is unusable (bad JSON, no paths).
    #[error("malformed sync request: {0}")]
    MalformedRequest(String),

    /// Transport-level error (connect, send, receive).
    #[error("transport error: {0}")]
    TransportError(String),

    /// Peer answered with a non-success status.
    #[error("peer {peer} answered with status {status}")]
    PeerStatus { peer: String, status: u16 },

    /// Peer body could not be decoded.
    #[error("invalid response from peer {peer}: {message}")]
    InvalidResponse { peer: String, message: String },

    /// Timeout waiting for peer.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    StoreError(#[from] sso_store::StoreError),
}

impl SyncError {
    /// HTTP status used when this error answers an inbound request.
    pub fn status_code(&self) -> u16 {
        match self {
            SyncError::NotConfigured | SyncError::StoreError(_) => 500,
            SyncError::NotAuthorized => 401,
            SyncError::MalformedRequest(_) => 400,
            SyncError::TransportError(_)
            | SyncError::PeerStatus { .. }
            | SyncError::InvalidResponse { .. } => 502,
            SyncError::Timeout(_) => 504,
        }
    }

    /// Plaintext body used when this error answers an inbound request.
    pub fn reply_text(&self) -> &'static str {
        match self {
            SyncError::NotConfigured => "No sync configured!",
            SyncError::NotAuthorized => "Not authorized",
            SyncError::MalformedRequest(_) => "Malformed sync request",
            SyncError::StoreError(_) => "Sync query failed",
            _ => "Bad gateway",
        }
    }
}

impl From<sso_core::CoreError> for SyncError {
    fn from(e: sso_core::CoreError) -> Self {
        SyncError::MalformedRequest(e.to_string())
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
