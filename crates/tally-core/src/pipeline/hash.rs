//! Content hashing for stored receipts.

use blake3::Hasher as Blake3Hasher;

/// Hex BLAKE3 digest of an in-memory blob.
///
/// Stored with each receipt so a re-upload of the same optimized image can be
/// recognised.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Blake3Hasher::new();
    hasher.update(data);
    hasher.finalize().to_hex().to_string()
}
