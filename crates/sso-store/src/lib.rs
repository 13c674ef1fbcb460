//! # SSO Store
//!
//! The user-store collaborator of the sync core. Provides a trait-based
//! interface over a keyed document store with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`UserStore`] - The async trait the sync core reads and writes through
//! - [`SqliteUserStore`] - SQLite-based persistent storage
//! - [`MemoryUserStore`] - In-memory storage for tests and embedding
//! - [`SaveOptions`] / [`SaveResult`] - Persisting a [`UserRecord`](sso_core::UserRecord)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sso_core::{Filter, UserRecord};
//! use sso_store::{SaveOptions, SqliteUserStore, UserStore};
//!
//! async fn example() {
//!     let store = SqliteUserStore::open("users.db").unwrap();
//!
//!     let mut user = UserRecord::new();
//!     user.set("username", "alice");
//!     user.set("email", "alice@example.com");
//!     store.save(&mut user, SaveOptions::default()).await.unwrap();
//!
//!     let found = store.find(&Filter::by("username", "alice")).await.unwrap();
//!     assert_eq!(found.len(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Unique identities**: `username` and `email` are unique across records,
//!   enforced on every save regardless of [`SaveOptions`].
//! - **No transactions**: each save stands alone; concurrent saves of the same
//!   user resolve last-write-wins.
//! - **Validation is optional**: sync writes pass
//!   [`SaveOptions::unvalidated`] because peer data is trusted once the peer
//!   authenticated.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryUserStore;
pub use sqlite::SqliteUserStore;
pub use traits::{validate_user, SaveOptions, SaveResult, UserStore};
