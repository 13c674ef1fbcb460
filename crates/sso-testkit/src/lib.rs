//! # SSO Testkit
//!
//! Testing utilities for SSO sync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: fixed legacy digests every implementation must reproduce
//! - **Generators**: Proptest strategies for field values, users and peers
//! - **Fixtures**: in-memory multi-node meshes and an instrumented store
//!
//! ## Golden Vectors
//!
//! ```rust
//! use sso_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, _) in verify_all_vectors() {
//!     assert!(matches, "{}", name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use sso_testkit::generators::{legacy_fields_from_params, UserParams};
//!
//! proptest! {
//!     #[test]
//!     fn legacy_fields_carry_salt(params: UserParams) {
//!         let fields = legacy_fields_from_params(&params);
//!         prop_assert!(fields.contains_key("salt"));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use sso_testkit::fixtures::{user, TestMesh};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mesh = TestMesh::new(&["a", "b"]).await;
//! mesh.node("b").seed(user("alice", "alice@example.com")).await;
//!
//! assert!(mesh.node("a").orchestrator.sync_user_by_username("alice", None).await);
//! # });
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{legacy_user, user, CountingStore, TestMesh, TestNode};
pub use generators::{legacy_fields_from_params, UserParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
