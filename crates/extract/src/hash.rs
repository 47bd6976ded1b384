use sha2::{Digest, Sha256};

/// Fingerprint length in hex characters — 128 bits of the SHA-256 digest,
/// ample collision resistance for a storage key while keeping rows compact.
pub const FINGERPRINT_LEN: usize = 32;

/// Compute the deduplication fingerprint of a raw message.
///
/// Hashes the exact raw bytes — before any whitespace normalization — so that
/// message variants that differ only in formatting stay distinguishable.
/// Pure function of the input; stable across restarts and platforms.
pub fn fingerprint(raw_text: &str) -> String {
    let mut hex = to_hex(&sha256_bytes(raw_text.as_bytes()));
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Compute SHA-256 of an in-memory byte slice.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode a raw 32-byte hash as a lowercase hex string (64 chars).
fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
