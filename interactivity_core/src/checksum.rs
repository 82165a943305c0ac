//! Audit digests for decisions.
//!
//! Not a security primitive: the digest only has to be stable across runs so a
//! decision can be matched back to the input that produced it.

use serde::Serialize;

/// Hex characters kept from the blake3 digest (64 bits).
const DIGEST_HEX_LEN: usize = 16;

/// Stable short digest of a string.
pub fn digest(input: &str) -> String {
    let hash = blake3::hash(input.as_bytes());
    let mut hex = hash.to_hex().to_string();
    hex.truncate(DIGEST_HEX_LEN);
    hex
}

/// Digest of a value's canonical JSON form.
pub fn digest_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(digest(&serde_json::to_string(value)?))
}
