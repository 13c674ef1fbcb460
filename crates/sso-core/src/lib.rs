//! # SSO Core
//!
//! Pure primitives for user-record synchronization between SSO nodes.
//!
//! This crate contains no I/O, no storage, no networking. It defines the
//! open field model that user records travel in, the peer topology, the wire
//! envelopes exchanged on `POST /sso/sync`, and the legacy password digest.
//!
//! ## Key Types
//!
//! - [`FieldValue`] / [`FieldMap`] - Schema-free, order-preserving field bags
//! - [`Filter`] - Field-equality query sent to peers and run against stores
//! - [`UserRecord`] - A locally persisted user (field bag + optional id)
//! - [`PeerConfig`] / [`SyncTopology`] - The static list of sync peers
//! - [`SyncQuery`] / [`SyncRequestEnvelope`] - Outbound and inbound bodies
//!
//! ## Legacy Passwords
//!
//! [`legacy_hash`] reproduces the deprecated two-round digest so that a node
//! can recognize peer-supplied passwords still stored under the old scheme.

pub mod crypto;
pub mod error;
pub mod filter;
pub mod messages;
pub mod peer;
pub mod types;
pub mod value;

pub use crypto::{legacy_hash, matches_legacy};
pub use error::{CoreError, Result};
pub use filter::Filter;
pub use messages::{
    DisclosedRecord, SyncCredentials, SyncQuery, SyncRequestEnvelope, SyncedFields, SYNC_PATH,
};
pub use peer::{PeerConfig, SyncTopology};
pub use types::{IdentityField, RecordId, UserRecord};
pub use value::{FieldMap, FieldValue};
