//! SQLite implementation of the UserStore trait.
//!
//! This is the persistent backend used by the node binary. It uses rusqlite
//! with bundled SQLite, wrapped in async via `tokio::task::spawn_blocking`.
//!
//! Records are stored as a JSON field bag. `username` and `email` are also
//! copied into UNIQUE columns so identity lookups hit an index and
//! uniqueness is enforced by the database. Only string identities are
//! indexed; other value types fall back to a scan.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};

use sso_core::{FieldMap, FieldValue, Filter, IdentityField, RecordId, UserRecord};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{validate_user, SaveOptions, SaveResult, UserStore};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await?
    }
}

/// Value for an identity column: the string identity, or NULL.
fn identity_column(fields: &FieldMap, identity: IdentityField) -> Option<String> {
    identity
        .value_in(fields)
        .and_then(FieldValue::as_str)
        .map(str::to_owned)
}

/// Map UNIQUE violations to [`StoreError::Conflict`].
fn constraint_error(e: rusqlite::Error, fields: &FieldMap) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            let identity = if msg.as_deref().is_some_and(|m| m.contains("users.email")) {
                IdentityField::Email
            } else {
                IdentityField::Username
            };
            StoreError::Conflict {
                field: identity.as_str().to_owned(),
                value: identity_column(fields, identity).unwrap_or_default(),
            }
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<UserRecord>> {
        let filter = filter.clone();

        self.with_conn(move |conn| {
            let mut clauses = Vec::new();
            let mut args: Vec<String> = Vec::new();
            for identity in IdentityField::ALL {
                if let Some(value) = filter.get(identity.as_str()).and_then(FieldValue::as_str) {
                    args.push(value.to_owned());
                    clauses.push(format!("{} = ?{}", identity.as_str(), args.len()));
                }
            }

            let mut sql = String::from("SELECT id, fields FROM users");
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY id");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (id, json) = row?;
                let fields: FieldMap = serde_json::from_str(&json)?;
                // The indexed clauses only cover string identities.
                if filter.matches(&fields) {
                    records.push(UserRecord {
                        id: Some(RecordId(id as u64)),
                        fields,
                    });
                }
            }
            Ok(records)
        })
        .await
    }

    async fn save(&self, record: &mut UserRecord, options: SaveOptions) -> Result<SaveResult> {
        if options.validate_before_save {
            validate_user(&record.fields)?;
        }

        let fields = record.fields.clone();
        let id = record.id;

        let result = self
            .with_conn(move |conn| {
                let json = serde_json::to_string(&fields)?;
                let username = identity_column(&fields, IdentityField::Username);
                let email = identity_column(&fields, IdentityField::Email);
                let now = now_millis();

                match id {
                    Some(id) => {
                        let changed = conn
                            .execute(
                                "UPDATE users
                                 SET username = ?1, email = ?2, fields = ?3, updated_at = ?4
                                 WHERE id = ?5",
                                params![username, email, json, now, id.0 as i64],
                            )
                            .map_err(|e| constraint_error(e, &fields))?;
                        if changed == 0 {
                            return Err(StoreError::NotFound(id));
                        }
                        Ok(SaveResult::Updated(id))
                    }
                    None => {
                        conn.execute(
                            "INSERT INTO users (username, email, fields, created_at, updated_at)
                             VALUES (?1, ?2, ?3, ?4, ?4)",
                            params![username, email, json, now],
                        )
                        .map_err(|e| constraint_error(e, &fields))?;
                        Ok(SaveResult::Created(RecordId(conn.last_insert_rowid() as u64)))
                    }
                }
            })
            .await?;

        if let SaveResult::Created(id) = result {
            record.id = Some(id);
        }
        Ok(result)
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(n as usize)
        })
        .await
    }
}
