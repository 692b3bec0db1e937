//! Checksum of cached timetable documents.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `content`.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
