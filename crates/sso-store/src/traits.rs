//! UserStore trait: the abstract interface for user persistence.
//!
//! The sync core only ever needs three things from a store: run a filter,
//! fetch one record by identity, and save a record. Implementations include
//! SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use sso_core::{FieldMap, Filter, IdentityField, RecordId, UserRecord};

use crate::error::{Result, StoreError};

/// Options for [`UserStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Run [`validate_user`] before writing.
    pub validate_before_save: bool,
}

impl SaveOptions {
    /// Skip validation. Used for peer-synced data.
    pub const fn unvalidated() -> Self {
        Self {
            validate_before_save: false,
        }
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            validate_before_save: true,
        }
    }
}

/// Result of saving a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// The record was new and has been assigned this id.
    Created(RecordId),
    /// An existing record was overwritten.
    Updated(RecordId),
}

impl SaveResult {
    pub fn id(&self) -> RecordId {
        match self {
            SaveResult::Created(id) | SaveResult::Updated(id) => *id,
        }
    }
}

/// The UserStore trait: async interface for user persistence.
///
/// # Design Notes
///
/// - **Unique identities**: saving a record whose `username` or `email`
///   belongs to a different record fails with [`StoreError::Conflict`].
/// - **Upsert by id**: a record with `id == None` is inserted and its id is
///   filled in; otherwise the stored field bag is replaced wholesale.
/// - **Ordering**: `find` returns records in creation order.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All records matching `filter`.
    async fn find(&self, filter: &Filter) -> Result<Vec<UserRecord>>;

    /// The first record matching `filter`.
    async fn find_one(&self, filter: &Filter) -> Result<Option<UserRecord>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Insert or overwrite `record`.
    async fn save(&self, record: &mut UserRecord, options: SaveOptions) -> Result<SaveResult>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
impl<S: UserStore + ?Sized> UserStore for Arc<S> {
    async fn find(&self, filter: &Filter) -> Result<Vec<UserRecord>> {
        (**self).find(filter).await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<UserRecord>> {
        (**self).find_one(filter).await
    }

    async fn save(&self, record: &mut UserRecord, options: SaveOptions) -> Result<SaveResult> {
        (**self).save(record, options).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}

/// Validation applied by stores when [`SaveOptions::validate_before_save`]
/// is set: both identity fields must be non-empty strings.
pub fn validate_user(fields: &FieldMap) -> Result<()> {
    for identity in IdentityField::ALL {
        match fields.get(identity.as_str()).and_then(|v| v.as_str()) {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(StoreError::Validation(format!(
                    "{} is required",
                    identity
                )))
            }
        }
    }
    Ok(())
}
