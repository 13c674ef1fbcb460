//! Field-selection of disclosed records.

use sso_core::{DisclosedRecord, FieldValue, UserRecord};

use crate::error::{Result, SyncError};

/// Restricts records to the fields a caller asked for.
///
/// Each output record holds exactly the requested paths, in request order.
/// A path the record lacks is present with a `null` value. An empty path
/// list is refused rather than read as "everything".
#[derive(Clone, Copy, Debug)]
pub struct ResponseProjector<'a> {
    paths: &'a [String],
}

impl<'a> ResponseProjector<'a> {
    pub fn new(paths: &'a [String]) -> Result<Self> {
        if paths.is_empty() {
            return Err(SyncError::MalformedRequest("no paths requested".into()));
        }
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[String] {
        self.paths
    }

    pub fn project_record(&self, record: &UserRecord) -> DisclosedRecord {
        self.paths
            .iter()
            .map(|path| {
                let value = record.get(path).cloned().unwrap_or(FieldValue::Null);
                (path.clone(), value)
            })
            .collect()
    }

    /// Project every record, keeping record order.
    pub fn project(&self, records: &[UserRecord]) -> Vec<DisclosedRecord> {
        records.iter().map(|r| self.project_record(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sso_core::FieldMap;

    fn paths(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn alice() -> UserRecord {
        let mut record = UserRecord::new();
        record.set("username", "alice");
        record.set("email", "alice@example.com");
        record.set("password", "hash");
        record
    }

    #[test]
    fn test_projects_only_requested_paths_in_order() {
        let requested = paths(&["email", "username"]);
        let projector = ResponseProjector::new(&requested).unwrap();

        let out = projector.project_record(&alice());
        let keys: Vec<_> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["email", "username"]);
        assert!(!out.contains_key("password"));
    }

    #[test]
    fn test_missing_path_is_null_not_error() {
        let requested = paths(&["username", "salt"]);
        let projector = ResponseProjector::new(&requested).unwrap();

        let out = projector.project_record(&alice());
        assert_eq!(out["salt"], FieldValue::Null);
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"username":"alice","salt":null}"#
        );
    }

    #[test]
    fn test_empty_paths_rejected() {
        let err = ResponseProjector::new(&[]).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRequest(_)));
    }

    #[test]
    fn test_record_order_preserved() {
        let requested = paths(&["username"]);
        let projector = ResponseProjector::new(&requested).unwrap();
        let records: Vec<_> = ["c", "a", "b"]
            .iter()
            .map(|name| {
                let mut r = UserRecord::new();
                r.set("username", *name);
                r
            })
            .collect();

        let out = projector.project(&records);
        let names: Vec<_> = out.iter().map(|r| r["username"].clone()).collect();
        assert_eq!(names, vec!["c".into(), "a".into(), "b".into()]);
    }

    proptest! {
        #[test]
        fn projection_key_set_equals_paths(
            fields in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,8}", 0..8),
            requested in prop::collection::btree_set("[a-z]{1,6}", 1..6),
        ) {
            let record = UserRecord::from_fields(
                fields.iter().map(|(k, v)| (k.clone(), FieldValue::from(v.as_str()))).collect::<FieldMap>(),
            );
            let requested: Vec<String> = requested.into_iter().collect();
            let projector = ResponseProjector::new(&requested).unwrap();

            let out = projector.project_record(&record);
            let keys: Vec<String> = out.keys().cloned().collect();
            prop_assert_eq!(keys, requested.clone());
            for path in &requested {
                let expected = fields.get(path).map(|v| FieldValue::from(v.as_str())).unwrap_or_default();
                prop_assert_eq!(&out[path.as_str()], &expected);
            }
        }
    }
}
