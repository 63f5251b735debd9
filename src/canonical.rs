//! Canonical serialization for deterministic fingerprints.
//!
//! Fingerprints identify dictionary snapshots and change reports without
//! comparing them structurally.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//! - Report fingerprints ignore entry ids and entry order

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::types::{ChangeReport, Dictionary};

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    // Plain data with string keys; serialization cannot fail.
    serde_json::to_vec(value).unwrap_or_default()
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Fingerprint of a dictionary snapshot, version included.
pub fn dictionary_fingerprint(dict: &Dictionary) -> String {
    canonical_hash_hex(dict)
}

/// Fingerprint of a dictionary's content, ignoring its version string.
pub fn content_fingerprint(dict: &Dictionary) -> String {
    canonical_hash_hex(&dict.files)
}

/// Fingerprint of a change report, independent of entry ids and order.
pub fn report_fingerprint(report: &ChangeReport) -> String {
    canonical_hash_hex(&report.signature())
}
