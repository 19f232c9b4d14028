//! # Shared Crypto - Hub Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | XChaCha20-Poly1305 | Hub wallet encryption at rest |
//! | `hashing` | Keccak-256 | Personal-sign digests, report hashes, addresses |
//! | `ecdsa` | secp256k1 | Recoverable hub signatures |
//!
//! ## Security Properties
//!
//! - **XChaCha20**: random 192-bit nonce per seal, key derived from the platform secret
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Secret material**: private key bytes are returned as `Zeroizing` buffers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use ecdsa::{recover_personal_signer, RecoverableSignature, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::{keccak256, personal_message_hash, Hash, Keccak256Hasher};
pub use symmetric::{Nonce, SealingKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
