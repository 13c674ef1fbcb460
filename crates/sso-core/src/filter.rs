//! Field-equality filters.
//!
//! A filter is what a node sends as `query` when asking peers for a user,
//! and what the receiving node runs against its local store.

use serde::{Deserialize, Serialize};

use crate::value::{FieldMap, FieldValue};

/// Equality filter over record fields.
///
/// A record matches when every filter field is present in the record with an
/// equal value. The empty filter matches every record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(FieldMap);

impl Filter {
    /// Create an empty (match-all) filter.
    pub fn new() -> Self {
        Self(FieldMap::new())
    }

    /// Create a single-field filter.
    pub fn by(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new().and(field, value)
    }

    /// Add another equality constraint.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Constraint on a given field, if any.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Iterate constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check a field bag against this filter.
    pub fn matches(&self, fields: &FieldMap) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }
}

impl From<FieldMap> for Filter {
    fn from(map: FieldMap) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, FieldValue)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = Filter::new();
        assert!(filter.matches(&FieldMap::new()));
        assert!(filter.matches(&record(&[("username", "bob".into())])));
    }

    #[test]
    fn test_single_field() {
        let filter = Filter::by("username", "alice");
        assert!(filter.matches(&record(&[
            ("username", "alice".into()),
            ("email", "a@example.com".into()),
        ])));
        assert!(!filter.matches(&record(&[("username", "Alice".into())])));
        assert!(!filter.matches(&record(&[("email", "alice".into())])));
    }

    #[test]
    fn test_all_constraints_required() {
        let filter = Filter::by("username", "alice").and("active", true);
        assert!(filter.matches(&record(&[
            ("username", "alice".into()),
            ("active", true.into()),
        ])));
        assert!(!filter.matches(&record(&[
            ("username", "alice".into()),
            ("active", false.into()),
        ])));
    }

    #[test]
    fn test_wire_shape() {
        let filter = Filter::by("email", "a@example.com");
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"email":"a@example.com"}"#
        );
    }
}
