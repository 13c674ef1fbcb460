//! Proptest generators for property-based testing.

use proptest::prelude::*;

use sso_core::{FieldMap, FieldValue, PeerConfig};

/// Generate a field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}".prop_map(String::from)
}

/// Generate a scalar field value.
pub fn scalar_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Integer),
        // Quarter steps keep floats exact through JSON.
        (-1_000_000i32..1_000_000).prop_map(|n| FieldValue::Float(f64::from(n) / 4.0)),
        "[ -~]{0,24}".prop_map(FieldValue::String),
    ]
}

/// Generate a field value, nesting lists and maps up to two levels.
pub fn field_value() -> impl Strategy<Value = FieldValue> {
    scalar_value().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(FieldValue::List),
            prop::collection::vec((field_name(), inner), 0..4)
                .prop_map(|pairs| FieldValue::Map(pairs.into_iter().collect())),
        ]
    })
}

/// Generate an open field bag.
pub fn field_map(max_len: usize) -> impl Strategy<Value = FieldMap> {
    prop::collection::vec((field_name(), field_value()), 0..=max_len)
        .prop_map(|pairs| pairs.into_iter().collect())
}

/// Generate a username.
pub fn username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.]{2,15}".prop_map(String::from)
}

/// Generate an email address.
pub fn email() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,11}", "[a-z]{2,8}").prop_map(|(local, domain)| format!("{}@{}.test", local, domain))
}

/// Generate a non-empty, duplicate-free path list in random order.
pub fn paths(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(field_name(), 1..=max_len.max(1))
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// Parameters for one user as a peer would disclose it.
#[derive(Debug, Clone)]
pub struct UserParams {
    pub username: String,
    pub email: String,
    pub password: String,
    pub salt: String,
    pub extra: FieldMap,
}

impl Arbitrary for UserParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            username(),
            email(),
            "[ -~]{1,24}",
            "[a-zA-Z0-9]{4,16}",
            field_map(4),
        )
            .prop_map(|(username, email, password, salt, mut extra)| {
                for reserved in ["username", "email", "password", "salt"] {
                    extra.shift_remove(reserved);
                }
                UserParams {
                    username,
                    email,
                    password,
                    salt,
                    extra,
                }
            })
            .boxed()
    }
}

/// Field bag for `params` with the password under the legacy digest.
pub fn legacy_fields_from_params(params: &UserParams) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("username".into(), params.username.as_str().into());
    fields.insert("email".into(), params.email.as_str().into());
    fields.insert(
        "password".into(),
        sso_core::legacy_hash(&params.password, &params.salt).into(),
    );
    fields.insert("salt".into(), params.salt.as_str().into());
    for (k, v) in &params.extra {
        fields.insert(k.clone(), v.clone());
    }
    fields
}

/// Generate a peer descriptor with a link on the `.test` domain.
pub fn peer_config() -> impl Strategy<Value = PeerConfig> {
    ("[a-z]{1,8}", "[A-Za-z0-9]{8,32}", paths(4)).prop_map(|(name, auth, paths)| {
        let link = format!("http://{}.test", name);
        PeerConfig::new(name, link, auth).with_paths(paths)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_paths_are_unique(paths in paths(6)) {
            let mut sorted = paths.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), paths.len());
            prop_assert!(!paths.is_empty());
        }

        #[test]
        fn field_values_survive_json(value in field_value()) {
            let json = serde_json::to_string(&value).unwrap();
            let back: FieldValue = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(value, back);
        }

        #[test]
        fn user_params_keep_identity(params: UserParams) {
            let fields = legacy_fields_from_params(&params);
            prop_assert_eq!(fields["username"].as_str(), Some(params.username.as_str()));
            prop_assert_eq!(fields.len(), 4 + params.extra.len());
        }

        #[test]
        fn generated_peers_validate_and_hide_auth(mut peer in peer_config()) {
            prop_assert!(peer.validate().is_ok());
            prop_assert!(!peer.paths.is_empty());
            let shown = format!("{:?}", peer);
            prop_assert!(!shown.contains(&peer.auth));
        }

        #[test]
        fn filters_match_their_own_fields(fields in field_map(6), keep in 0usize..6) {
            let subset: FieldMap = fields
                .iter()
                .take(keep)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let filter = sso_core::Filter::from(subset);
            prop_assert!(filter.matches(&fields));

            // Field names are generated lowercase, so this one is never present.
            let narrowed = filter.and("Missing", FieldValue::Null);
            prop_assert!(!narrowed.matches(&fields));
        }
    }
}
