//! Golden vectors for the legacy password digest.
//!
//! Nodes still holding legacy digests were written by other software, so
//! these fixed outputs pin the exact byte layout of the scheme.

use sso_core::legacy_hash;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub password: &'static str,
    pub salt: &'static str,
    /// Expected lowercase hex digest.
    pub expected: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "plain ascii",
            password: "secret",
            salt: "s4lt",
            expected: "7892f2a6aab493aab2a687e62f9f68fd83a1a2454347bc243ecc519d3bbea943",
        },
        GoldenVector {
            name: "empty password and salt",
            password: "",
            salt: "",
            expected: "3b7546ed79e3e5a7907381b093c5a182cbf364c5dd0443dfa956c8cca271cc33",
        },
        GoldenVector {
            name: "passphrase with spaces",
            password: "correct horse battery staple",
            salt: "NaCl",
            expected: "c0fa948ba187b4905059d7f32f76d6fd4409abf0d66dd15e99a4e4580c3587ed",
        },
        GoldenVector {
            name: "utf-8 input",
            password: "pässwörd",
            salt: "ümlaut",
            expected: "a50a0faf733c921cb62fa278be83abf063e047526acc05472a472e4760a27282",
        },
    ]
}

/// Check every vector; returns `(name, matches, actual)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = legacy_hash(v.password, v.salt);
            (v.name.to_string(), actual == v.expected, actual)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{}' produced {}", name, actual);
        }
    }

    #[test]
    fn test_vectors_are_distinct() {
        let vectors = all_vectors();
        for (i, a) in vectors.iter().enumerate() {
            for b in &vectors[i + 1..] {
                assert_ne!(a.expected, b.expected, "{} vs {}", a.name, b.name);
            }
        }
    }
}
