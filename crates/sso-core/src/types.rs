//! Identifiers and the local user record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::value::{FieldMap, FieldValue};

/// Store-assigned identifier of a persisted user record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The unique field a sync is keyed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Username,
    Email,
}

impl IdentityField {
    /// Field name as stored and sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            IdentityField::Username => "username",
            IdentityField::Email => "email",
        }
    }

    /// Both identity fields, in lookup order.
    pub const ALL: [IdentityField; 2] = [IdentityField::Username, IdentityField::Email];

    /// Value of this identity in a field bag, ignoring absent values.
    pub fn value_in<'a>(self, fields: &'a FieldMap) -> Option<&'a FieldValue> {
        fields.get(self.as_str()).filter(|v| !v.is_null())
    }

    /// Filter selecting the record with this identity value.
    pub fn filter(self, value: impl Into<FieldValue>) -> Filter {
        Filter::by(self.as_str(), value)
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as held by the local store.
///
/// `id` is `None` for a record that was constructed but never saved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserRecord {
    pub id: Option<RecordId>,
    pub fields: FieldMap,
}

impl UserRecord {
    /// Construct a new, empty, unsaved record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an unsaved record from a field bag.
    pub fn from_fields(fields: FieldMap) -> Self {
        Self { id: None, fields }
    }

    /// Read a field. Missing fields read as `None`.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Overwrite (or add) a field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}
