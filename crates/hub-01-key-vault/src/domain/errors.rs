//! # Domain Errors
//!
//! Error types for the Key Vault.

use shared_crypto::CryptoError;
use shared_types::Address;
use std::time::Duration;
use thiserror::Error;

/// Key Vault error types.
///
/// Every variant is a local misconfiguration or storage fault. None of them
/// is retried; callers surface them as-is.
#[derive(Debug, Error)]
pub enum KeyVaultError {
    /// No hub wallet has been created yet.
    #[error("Hub wallet not available")]
    KeyUnavailable,

    /// Stored key material does not decrypt with the current platform secret.
    #[error("Hub wallet decryption failed: {0}")]
    DecryptionFailed(String),

    /// Decrypted key does not match the persisted address.
    #[error("Hub wallet address mismatch: stored {stored}, derived {derived}")]
    AddressMismatch {
        /// Address persisted next to the key.
        stored: Address,
        /// Address derived from the decrypted key.
        derived: Address,
    },

    /// The persisted wallet record is unreadable.
    #[error("Hub wallet record corrupted: {0}")]
    Corrupted(String),

    /// Wallet storage failure.
    #[error("Wallet storage error: {0}")]
    Store(String),

    /// Administrative wallet could not provide bootstrap material.
    #[error("Admin wallet unavailable: {0}")]
    AdminKey(String),

    /// Signing did not complete in time.
    #[error("Signing timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying cryptographic failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl KeyVaultError {
    /// Stable message key reported to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyUnavailable => "wom.hubWalletNotFound",
            Self::DecryptionFailed(_) | Self::AddressMismatch { .. } => {
                "wom.hubWalletDecryptionFailed"
            }
            Self::Corrupted(_) | Self::Store(_) => "wom.hubWalletStorageError",
            Self::AdminKey(_) => "wom.adminWalletUnavailable",
            Self::Timeout(_) => "wom.signatureTimeout",
            Self::Crypto(_) => "wom.signatureError",
        }
    }
}
