//! # SSO
//!
//! On-demand user synchronization between independently running nodes.
//!
//! ## Overview
//!
//! A node answers `POST /sso/sync` for its configured peers and, when it
//! needs a user it does not hold (or suspects is stale), pulls that user from
//! every peer and merges the answers into its local store. Peer passwords
//! still under the legacy digest are upgraded on the way in when the caller
//! supplies the matching plaintext.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sso::{build_router, NodeConfig, SsoNode};
//! use sso::store::SqliteUserStore;
//! use sso::sync::HttpTransport;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = NodeConfig::load("sso.json")?;
//!     let store = SqliteUserStore::open("users.db")?;
//!     let transport = HttpTransport::new(config.request_timeout())?;
//!
//!     let node = SsoNode::new(config, store, transport);
//!     let router = build_router(&node);
//!
//!     // Login path: refresh the user from peers before checking credentials.
//!     let synced = node.sync_user_by_username("alice", Some("plaintext")).await;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `sso::core` - Field values, filters, peers and wire messages
//! - `sso::store` - User store abstraction, memory and SQLite backends
//! - `sso::sync` - Sync protocol: responder, dispatcher, merger, orchestrator

pub mod config;
pub mod error;
pub mod node;
pub mod routes;

// Re-export component crates
pub use sso_core as core;
pub use sso_store as store;
pub use sso_sync as sync;

pub use config::NodeConfig;
pub use error::{NodeError, Result};
pub use node::{build_router, open_store, SharedStore, SharedTransport, SsoNode};
pub use routes::{reply_response, serve, AxumRegistrar, RouteMethod, RouteRegistrar};

// Re-export commonly used types
pub use sso_core::{FieldMap, FieldValue, Filter, IdentityField, PeerConfig, SyncTopology};
pub use sso_sync::{SyncPhase, SyncReport};
