//! # SSO Sync
//!
//! On-demand user synchronization between SSO nodes.
//!
//! ## Overview
//!
//! A node that needs authoritative data for a user (typically during login)
//! asks every configured peer for it, and folds whatever comes back into its
//! local user store. Every node also answers such queries for its peers,
//! disclosing only the fields the caller asked for.
//!
//! ## Key Properties
//!
//! - **Best-effort**: outbound sync never fails; it reports `true` if any
//!   record was created or updated and `false` otherwise
//! - **Failure isolation**: one unreachable peer or one bad record never
//!   aborts the rest of the sync
//! - **Authenticated disclosure**: no store read happens before the caller's
//!   shared secret is accepted
//! - **Legacy migration**: peer passwords still under the old digest are
//!   replaced by the caller's verified plaintext so the local store rehashes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sso_core::{PeerConfig, SyncTopology};
//! use sso_store::MemoryUserStore;
//! use sso_sync::{DispatchConfig, HttpTransport, SyncOrchestrator};
//!
//! async fn example() {
//!     let topology = SyncTopology::new(vec![
//!         PeerConfig::new("eu", "https://eu.example.com", "shared-secret")
//!             .with_paths(["username", "email", "password", "salt"]),
//!     ]);
//!     let transport = HttpTransport::new(None).unwrap();
//!     let orchestrator = SyncOrchestrator::new(
//!         MemoryUserStore::new(),
//!         transport,
//!         topology,
//!         DispatchConfig::default(),
//!     );
//!
//!     let synced = orchestrator
//!         .sync_user_by_username("alice", Some("plaintext"))
//!         .await;
//!     println!("synced: {}", synced);
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Node A (login for "alice")                 Node B (peer)
//!   | SyncOrchestrator                          |
//!   |   PeerDispatcher --- POST /sso/sync ----->| SyncResponder
//!   |                                           |   SyncAuthenticator
//!   |                                           |   UserStore::find
//!   |                <-- [ {fields...} ] -------|   ResponseProjector
//!   |   RecordMerger (legacy check, upsert)     |
//!   |   -> bool                                 |
//! ```

pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod merger;
pub mod orchestrator;
pub mod projector;
pub mod responder;
pub mod transport;

pub use auth::SyncAuthenticator;
pub use dispatcher::{DispatchConfig, PeerDispatcher, PeerResponse};
pub use error::{Result, SyncError};
pub use http::HttpTransport;
pub use merger::{migrate_legacy_password, MergeReport, RecordMerger};
pub use orchestrator::{SyncOrchestrator, SyncPhase, SyncReport};
pub use projector::ResponseProjector;
pub use responder::{InboundHandler, InboundReply, ReplyBody, SyncResponder};
pub use transport::{memory::Fault, memory::MemoryNetwork, memory::MemoryTransport, PeerTransport};
