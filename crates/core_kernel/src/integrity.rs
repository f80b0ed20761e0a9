//! Deterministic integrity hashing for tamper detection
//!
//! Guides and batches carry a content hash over an explicitly enumerated
//! subset of their business fields. The hash must be stable across platforms,
//! locales, and field insertion order: canonical fields are collected into a
//! sorted map and serialized as `key=value` lines before hashing, so two
//! records with identical business values always produce identical digests.
//!
//! Free-text fields (notes, error messages) are never part of the canonical
//! set; re-rendering XML or editing annotations must not invalidate a hash.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A record whose business fields can be canonicalized for hashing
pub trait Canonical {
    /// A stable tag distinguishing entity kinds, so a guide and a batch with
    /// coincidentally equal fields never collide
    fn entity_kind(&self) -> &'static str;

    /// The enumerated business fields covered by the integrity hash.
    ///
    /// Values must already be in a locale-independent rendering (wire-format
    /// decimals, ISO-8601 dates). BTreeMap guarantees lexicographic key order.
    fn canonical_fields(&self) -> BTreeMap<String, String>;
}

/// Computes the SHA-256 integrity hash of a record as 64 lowercase hex chars
pub fn integrity_hash<R: Canonical>(record: &R) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.entity_kind().as_bytes());
    hasher.update(b"\n");
    for (key, value) in record.canonical_fields() {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }
    to_hex(&hasher.finalize())
}

/// Verifies a record against its stored hash
pub fn verify_integrity<R: Canonical>(record: &R, stored_hash: &str) -> bool {
    integrity_hash(record) == stored_hash
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // write! to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    out
}
