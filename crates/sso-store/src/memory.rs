//! In-memory implementation of the UserStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use sso_core::{FieldMap, Filter, IdentityField, RecordId, UserRecord};

use crate::error::{Result, StoreError};
use crate::traits::{validate_user, SaveOptions, SaveResult, UserStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryUserStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Field bags by id; BTreeMap keeps creation order.
    records: BTreeMap<RecordId, FieldMap>,

    /// Next id to hand out.
    next_id: u64,
}

impl MemoryUserStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a store pre-populated with the given field bags.
    ///
    /// Seeds bypass validation and uniqueness checks.
    pub fn with_records(records: impl IntoIterator<Item = FieldMap>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            for fields in records {
                let id = RecordId(inner.next_id);
                inner.next_id += 1;
                inner.records.insert(id, fields);
            }
        }
        store
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    /// Fail if another record already holds one of `fields`' identities.
    fn check_unique(&self, own: Option<RecordId>, fields: &FieldMap) -> Result<()> {
        for identity in IdentityField::ALL {
            let Some(value) = identity.value_in(fields) else {
                continue;
            };
            let taken = self
                .records
                .iter()
                .any(|(id, other)| Some(*id) != own && identity.value_in(other) == Some(value));
            if taken {
                return Err(StoreError::Conflict {
                    field: identity.as_str().to_owned(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<UserRecord>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .iter()
            .filter(|(_, fields)| filter.matches(fields))
            .map(|(id, fields)| UserRecord {
                id: Some(*id),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn save(&self, record: &mut UserRecord, options: SaveOptions) -> Result<SaveResult> {
        if options.validate_before_save {
            validate_user(&record.fields)?;
        }

        let mut inner = self.write()?;
        inner.check_unique(record.id, &record.fields)?;

        match record.id {
            Some(id) => {
                let slot = inner.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
                *slot = record.fields.clone();
                Ok(SaveResult::Updated(id))
            }
            None => {
                let id = RecordId(inner.next_id);
                inner.next_id += 1;
                inner.records.insert(id, record.fields.clone());
                record.id = Some(id);
                Ok(SaveResult::Created(id))
            }
        }
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> UserRecord {
        let mut record = UserRecord::new();
        record.set("username", username);
        record.set("email", email);
        record
    }

    #[tokio::test]
    async fn test_memory_store_create_then_update() {
        let store = MemoryUserStore::new();
        let mut alice = user("alice", "alice@example.com");

        let created = store.save(&mut alice, SaveOptions::default()).await.unwrap();
        assert!(matches!(created, SaveResult::Created(_)));
        assert_eq!(alice.id, Some(created.id()));

        alice.set("name", "Alice");
        let updated = store.save(&mut alice, SaveOptions::default()).await.unwrap();
        assert_eq!(updated, SaveResult::Updated(created.id()));

        let found = store
            .find_one(&Filter::by("username", "alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get("name"), Some(&"Alice".into()));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_unique_identity() {
        let store = MemoryUserStore::new();
        store
            .save(&mut user("alice", "shared@example.com"), SaveOptions::default())
            .await
            .unwrap();

        let err = store
            .save(&mut user("bob", "shared@example.com"), SaveOptions::unvalidated())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref field, .. } if field == "email"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_validation_optional() {
        let store = MemoryUserStore::new();
        let mut partial = UserRecord::new();
        partial.set("username", "carol");

        assert!(store
            .save(&mut partial, SaveOptions::default())
            .await
            .is_err());
        assert!(store
            .save(&mut partial, SaveOptions::unvalidated())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_find_in_creation_order() {
        let store = MemoryUserStore::new();
        for name in ["c", "a", "b"] {
            let mut record = UserRecord::new();
            record.set("username", name);
            record.set("team", "core");
            store.save(&mut record, SaveOptions::unvalidated()).await.unwrap();
        }

        let names: Vec<_> = store
            .find(&Filter::by("team", "core"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.get("username").cloned().unwrap())
            .collect();
        assert_eq!(names, vec!["c".into(), "a".into(), "b".into()]);
    }
}
