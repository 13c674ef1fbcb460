//! Error types for the node.

use std::path::PathBuf;

use sso_core::CoreError;
use sso_store::StoreError;
use sso_sync::SyncError;
use thiserror::Error;

/// Errors that can occur while assembling or running a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for a node config.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Config parsed but failed validation.
    #[error("invalid config: {0}")]
    Config(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Sync error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Listener or server failure.
    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
