//! Exact-match content fingerprint.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw JD text.
///
/// Pure and deterministic. Used both as the storage-unique snapshot key and
/// as the cheap exact-duplicate probe performed before any SimHash work.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = content_hash("Backend engineer, 3+ years");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinct_text_distinct_hash() {
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    proptest! {
        #[test]
        fn prop_content_hash_deterministic(text in ".*") {
            prop_assert_eq!(content_hash(&text), content_hash(&text));
        }
    }
}
