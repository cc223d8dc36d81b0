//! Content hashing over canonical JSON.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::VerityError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided payload using canonical JSON ordering.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, VerityError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// Hex-encoded SHA-256 digest of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Combines several checksums into one, independent of their order.
pub fn combine_checksums<'a, I>(checksums: I) -> Result<String, VerityError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = checksums.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() == 1 {
        return Ok(sorted[0].to_string());
    }
    stable_hash_string(&sorted)
}
