//! Folding peer-disclosed fields into the local store.

use sso_core::{matches_legacy, IdentityField, SyncedFields, UserRecord};
use sso_store::{SaveOptions, SaveResult, UserStore};

/// Counts from one merge pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// New local records.
    pub created: usize,
    /// Existing local records overwritten.
    pub updated: usize,
    /// Entries without the identity field.
    pub skipped: usize,
    /// Entries whose lookup or save failed.
    pub failed: usize,
}

impl MergeReport {
    /// Records created or updated.
    pub fn touched(&self) -> usize {
        self.created + self.updated
    }

    /// Add another report's counts to this one.
    pub fn absorb(&mut self, other: MergeReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Replace a legacy password digest with the caller's verified plaintext.
///
/// Applies only when `plaintext` is given, `password` and `salt` are both
/// strings, and `password` is the legacy digest of `plaintext` under
/// `salt`. Returns whether the entry was rewritten.
pub fn migrate_legacy_password(fields: &mut SyncedFields, plaintext: Option<&str>) -> bool {
    let Some(plaintext) = plaintext else {
        return false;
    };
    let is_legacy = match (
        fields.get("password").and_then(|v| v.as_str()),
        fields.get("salt").and_then(|v| v.as_str()),
    ) {
        (Some(stored), Some(salt)) => matches_legacy(stored, plaintext, salt),
        _ => false,
    };
    if is_legacy {
        fields.insert("password".to_owned(), plaintext.into());
    }
    is_legacy
}

/// Upserts synced field sets into a [`UserStore`].
pub struct RecordMerger<S: UserStore> {
    store: S,
}

impl<S: UserStore> RecordMerger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merge `entries` keyed by `identity`.
    ///
    /// Entries are applied one at a time in the given order, so a later
    /// entry for the same user overwrites an earlier one. A bad entry is
    /// logged and counted; it never stops the batch.
    pub async fn merge(
        &self,
        identity: IdentityField,
        entries: Vec<SyncedFields>,
        password: Option<&str>,
    ) -> MergeReport {
        let mut report = MergeReport::default();

        for mut fields in entries {
            let Some(key) = identity.value_in(&fields).cloned() else {
                tracing::debug!(identity = %identity, "skipping synced entry without identity");
                report.skipped += 1;
                continue;
            };

            let mut record = match self.store.find_one(&identity.filter(key.clone())).await {
                Ok(Some(record)) => record,
                Ok(None) => UserRecord::new(),
                Err(e) => {
                    tracing::warn!(identity = %identity, error = %e, "local lookup failed");
                    report.failed += 1;
                    continue;
                }
            };

            if migrate_legacy_password(&mut fields, password) {
                tracing::debug!(identity = %identity, "migrating legacy password");
            }

            // Null marks a path the peer does not hold; keep the local value.
            for (field, value) in fields {
                if !value.is_null() {
                    record.set(field, value);
                }
            }

            match self.store.save(&mut record, SaveOptions::unvalidated()).await {
                Ok(SaveResult::Created(id)) => {
                    tracing::debug!(id = %id, identity = %identity, "created synced user");
                    report.created += 1;
                }
                Ok(SaveResult::Updated(id)) => {
                    tracing::debug!(id = %id, identity = %identity, "updated synced user");
                    report.updated += 1;
                }
                Err(e) => {
                    tracing::warn!(identity = %identity, value = %key, error = %e, "saving synced user failed");
                    report.failed += 1;
                }
            }
        }

        report
    }
}
