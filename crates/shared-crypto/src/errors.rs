//! Errors of the hub cryptographic primitives.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD sealing failed.
    #[error("Sealing failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key (rotated platform secret) or tampered ciphertext.
    #[error("Sealed secret does not open with this key: {0}")]
    DecryptionFailed(String),

    /// Stored nonce of the wrong size.
    #[error("Nonce must be {expected} bytes, got {actual}")]
    InvalidNonceLength {
        /// Required length.
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// Bytes are not a valid secp256k1 scalar.
    #[error("Invalid secp256k1 private key")]
    InvalidPrivateKey,

    /// Not a 65-byte `r || s || v` signature.
    #[error("Malformed recoverable signature")]
    InvalidSignature,

    /// `v` is neither `0/1` nor `27/28`.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// The signer rejected the digest.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// No public key recovers from the signature and digest.
    #[error("Public key recovery failed")]
    RecoveryFailed,
}
