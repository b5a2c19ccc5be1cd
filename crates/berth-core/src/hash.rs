//! Content hashing for source identifiers.
//!
//! Source hashes are lowercase hex and unique per distinct content; callers
//! derive them here before building a descriptor.

use blake3::Hasher;
use serde::Serialize;

use crate::error::Result;

/// Derive a source hash from raw artifact content.
pub fn source_hash_bytes(bytes: &[u8]) -> String {
    let mut h = Hasher::new();
    h.update(bytes);
    h.finalize().to_hex().to_string()
}

pub fn source_hash_str(s: &str) -> String {
    source_hash_bytes(s.as_bytes())
}

/// Hash any serde-serializable value deterministically (via JSON).
pub fn source_hash_serde<T: Serialize>(v: &T) -> Result<String> {
    let bytes = serde_json::to_vec(v)?;
    Ok(source_hash_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_content_distinct_hash() {
        assert_ne!(source_hash_str("a"), source_hash_str("b"));
        assert_eq!(source_hash_str("a"), source_hash_str("a"));
        assert_eq!(source_hash_str("a"), source_hash_bytes(b"a"));
    }
}
