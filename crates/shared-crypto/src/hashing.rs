//! # Keccak-256 Hashing
//!
//! Ethereum flavoured Keccak-256 (not NIST SHA3-256) and the personal-sign
//! message digest.

use sha3::{Digest, Keccak256};

/// Keccak-256 output (256-bit).
pub type Hash = [u8; 32];

/// Prefix applied before hashing a personal-sign message.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Stateful Keccak-256 hasher.
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for Keccak256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Digest signed by a personal-sign signature:
/// `keccak256("\x19Ethereum Signed Message:\n" + len(message) + message)`.
pub fn personal_message_hash(message: &[u8]) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    hasher
        .update(PERSONAL_MESSAGE_PREFIX.as_bytes())
        .update(message.len().to_string().as_bytes())
        .update(message);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = Keccak256Hasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize(), keccak256(b"hello world"));
    }

    #[test]
    fn test_personal_hash_includes_prefix_and_length() {
        let message = b"hello";
        let expected = keccak256(b"\x19Ethereum Signed Message:\n5hello");
        assert_eq!(personal_message_hash(message), expected);
        assert_ne!(personal_message_hash(message), keccak256(message));
    }
}
