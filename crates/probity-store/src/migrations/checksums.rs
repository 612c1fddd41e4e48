//! SHA-256 checksums of migration bodies

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a migration body
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
