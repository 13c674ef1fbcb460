//! Legacy password digest.
//!
//! Older nodes stored passwords as a two-round SHA-256 digest:
//!
//! ```text
//! legacy = hex(sha256( hex(sha256(password)) || hex(sha256(salt)) ))
//! ```
//!
//! This module only recognizes that scheme. It never produces credentials;
//! hashing under the current scheme belongs to the user store.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compute the legacy digest of `plaintext` under `salt`.
pub fn legacy_hash(plaintext: &str, salt: &str) -> String {
    let mut second = sha256_hex(plaintext.as_bytes());
    second.push_str(&sha256_hex(salt.as_bytes()));
    sha256_hex(second.as_bytes())
}

/// True if `stored` is the legacy digest of `plaintext` under `salt`.
pub fn matches_legacy(stored: &str, plaintext: &str, salt: &str) -> bool {
    legacy_hash(plaintext, salt) == stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_shape() {
        let digest = legacy_hash("secret", "s4lt");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_two_rounds() {
        let first = sha256_hex(b"secret");
        let salt = sha256_hex(b"s4lt");
        let expected = sha256_hex(format!("{}{}", first, salt).as_bytes());
        assert_eq!(legacy_hash("secret", "s4lt"), expected);
    }

    #[test]
    fn test_inputs_change_output() {
        let base = legacy_hash("secret", "s4lt");
        assert_ne!(base, legacy_hash("secret2", "s4lt"));
        assert_ne!(base, legacy_hash("secret", "s4lt2"));
        assert_ne!(base, legacy_hash("s4lt", "secret"));
    }

    #[test]
    fn test_matches_legacy() {
        let stored = legacy_hash("secret", "s4lt");
        assert!(matches_legacy(&stored, "secret", "s4lt"));
        assert!(!matches_legacy(&stored, "Secret", "s4lt"));
        assert!(!matches_legacy("secret", "secret", "s4lt"));
    }

    proptest! {
        #[test]
        fn legacy_hash_is_deterministic(pw in ".{0,32}", salt in ".{0,16}") {
            prop_assert_eq!(legacy_hash(&pw, &salt), legacy_hash(&pw, &salt));
        }

        #[test]
        fn distinct_passwords_differ(a in "[a-z]{1,16}", b in "[a-z]{1,16}", salt in "[a-z0-9]{4}") {
            prop_assume!(a != b);
            prop_assert_ne!(legacy_hash(&a, &salt), legacy_hash(&b, &salt));
        }
    }
}
