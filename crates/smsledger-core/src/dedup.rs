//! Content-addressed deduplication
//!
//! Carriers re-deliver the same SMS, sometimes hours apart. The dedup hash is
//! built from the sender, the amount and a stable fragment of the body (the
//! bank's reference id when present), so a re-delivery always collides while
//! two genuine transactions almost never do. The receive time is not part of
//! the hash.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::models::ParseResult;
use crate::patterns::{PatternCategory, PatternTable};

/// Length of the normalized body prefix used when no reference id is found
pub const FINGERPRINT_PREFIX_CHARS: usize = 64;

/// Stable identifying fragment of a message body.
///
/// Prefers a bank reference / transaction id; otherwise the body lowercased,
/// whitespace-collapsed and cut to its first 64 characters. A captured
/// token without a digit is an ordinary word, not an id.
pub fn fingerprint(body: &str, table: &PatternTable) -> String {
    if let Some(m) = table
        .first_capture(PatternCategory::Reference, body)
        .filter(|m| m.value.chars().any(|c| c.is_ascii_digit()))
    {
        return format!("ref:{}", m.value.to_uppercase());
    }

    let normalized = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let prefix: String = normalized.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
    format!("body:{}", prefix)
}

/// Canonical string fed to the hash: `SENDER|amount|fingerprint`
pub fn canonical_string(sender: &str, amount: f64, fingerprint: &str) -> String {
    format!(
        "{}|{:.2}|{}",
        sender.trim().to_uppercase(),
        amount,
        fingerprint
    )
}

/// Hex-encoded SHA-256 of a canonical string
pub fn hash_canonical(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Dedup hash for a classified notification
pub fn dedup_hash(sender: &str, amount: f64, body: &str, table: &PatternTable) -> String {
    hash_canonical(&canonical_string(sender, amount, &fingerprint(body, table)))
}

/// Set of dedup hashes already seen.
///
/// Stands in for the storage layer's duplicate check during bulk imports.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with hashes that are already stored
    pub fn with_known(hashes: impl IntoIterator<Item = String>) -> Self {
        Self {
            seen: hashes.into_iter().collect(),
        }
    }

    /// Record a result. Returns true the first time its hash is seen.
    pub fn insert(&mut self, result: &ParseResult) -> bool {
        self.seen.insert(result.dedup_hash.clone())
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.seen.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::builtin().unwrap()
    }

    #[test]
    fn test_fingerprint_prefers_reference() {
        let t = table();
        assert_eq!(
            fingerprint("Rs 10 debited. UPI Ref: 12345678.", &t),
            "ref:12345678"
        );
        assert_eq!(
            fingerprint("Paid Rs 2000 via Amazon Pay. Txn ID: ab99887766", &t),
            "ref:AB99887766"
        );
        assert_eq!(fingerprint("NEFT UTR no. SBIN0012345 credited", &t), "ref:SBIN0012345");
    }

    #[test]
    fn test_fingerprint_falls_back_to_prefix() {
        let body = format!("Rs 10   debited\nfrom a/c 1234 {}", "x".repeat(100));
        let fp = fingerprint(&body, &table());
        assert!(fp.starts_with("body:rs 10 debited from a/c 1234"));
        assert_eq!(fp.chars().count(), "body:".len() + FINGERPRINT_PREFIX_CHARS);
    }

    #[test]
    fn test_reference_word_is_not_an_id() {
        let t = table();
        let body = |date: &str| {
            format!(
                "Rs 250 debited from a/c XX1234 on {} at CAFE. \
                 Keep this SMS for reference purposes.",
                date
            )
        };
        let a = body("12-02-26");
        let b = body("13-02-26");
        assert!(fingerprint(&a, &t).starts_with("body:"));
        assert_ne!(
            dedup_hash("HDFCBK", 250.0, &a, &t),
            dedup_hash("HDFCBK", 250.0, &b, &t)
        );
    }

    #[test]
    fn test_short_or_digitless_reference_falls_back() {
        let t = table();
        assert!(fingerprint("Rs 10 debited. Ref: 12345", &t).starts_with("body:"));
        assert!(fingerprint("Rs 10 debited. Txn ID: PENDING", &t).starts_with("body:"));
        assert_eq!(fingerprint("Rs 10 debited. Ref no. 123456", &t), "ref:123456");
    }

    #[test]
    fn test_digitless_override_capture_falls_back() {
        let t = PatternTable::from_toml(
            r#"
[[reference]]
pattern = '''(?i)\bref\s+([a-z]+)'''
"#,
        )
        .unwrap();
        assert!(fingerprint("Rs 10 debited ref purposes", &t).starts_with("body:"));
    }

    #[test]
    fn test_canonical_string() {
        assert_eq!(
            canonical_string(" hdfcbk ", 1500.0, "ref:123456"),
            "HDFCBK|1500.00|ref:123456"
        );
    }

    #[test]
    fn test_hash_is_deterministic_hex() {
        let a = hash_canonical("HDFCBK|1500.00|ref:123456");
        let b = hash_canonical("HDFCBK|1500.00|ref:123456");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_any_change_changes_hash() {
        let base = hash_canonical("HDFCBK|1500.00|ref:123456");
        assert_ne!(base, hash_canonical("HDFCBK|1500.00|ref:123457"));
        assert_ne!(base, hash_canonical("HDFCBK|1500.01|ref:123456"));
        assert_ne!(base, hash_canonical("ICICIB|1500.00|ref:123456"));
    }

    #[test]
    fn test_redelivery_with_different_whitespace_collides() {
        let t = table();
        let a = dedup_hash("HDFCBK", 10.0, "Rs 10 debited from a/c 1234", &t);
        let b = dedup_hash("hdfcbk", 10.0, "Rs 10  debited from\na/c 1234", &t);
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_reference_different_amount_differs() {
        let t = table();
        let a = dedup_hash("HDFCBK", 10.0, "Rs 10 debited. Ref 99887766", &t);
        let b = dedup_hash("HDFCBK", 11.0, "Rs 11 debited. Ref 99887766", &t);
        assert_ne!(a, b);
    }
}
