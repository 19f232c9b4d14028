//! # Wallet Entities
//!
//! The persisted hub wallet record and its at-rest ciphertext.

use super::errors::KeyVaultError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_crypto::Nonce;
use shared_types::Address;

/// Where the hub key material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletOrigin {
    /// Copied from the platform administrative wallet on first use.
    BootstrappedFromAdmin,
    /// Freshly generated because no admin material was available.
    Generated,
}

/// Ciphertext plus nonce produced by a `SecretCodec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    /// Encrypted bytes (including the authentication tag).
    pub ciphertext: Vec<u8>,
    /// Nonce used for this ciphertext.
    pub nonce: Nonce,
}

/// The hub wallet as persisted in instance-local storage.
///
/// Written once. Disconnecting from the federation never removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWallet {
    /// Hub address, lowercase `0x` hex.
    pub address: String,
    /// Hex-encoded encrypted private key.
    pub wallet: String,
    /// Hex-encoded 24-byte nonce.
    pub nonce: String,
    /// Origin of the key material.
    pub origin: WalletOrigin,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl StoredWallet {
    /// Build a record for a freshly sealed key.
    pub fn new(address: Address, sealed: &SealedSecret, origin: WalletOrigin) -> Self {
        Self {
            address: address.to_hex(),
            wallet: hex::encode(&sealed.ciphertext),
            nonce: hex::encode(sealed.nonce.as_bytes()),
            origin,
            created_at: Utc::now(),
        }
    }

    /// The persisted address, when it is a well-formed `0x` address.
    pub fn hub_address(&self) -> Option<Address> {
        if self.address.starts_with("0x") {
            self.address.parse().ok()
        } else {
            None
        }
    }

    /// Decode the sealed key material.
    pub fn sealed(&self) -> Result<SealedSecret, KeyVaultError> {
        let ciphertext =
            hex::decode(&self.wallet).map_err(|e| KeyVaultError::Corrupted(e.to_string()))?;
        let nonce_bytes =
            hex::decode(&self.nonce).map_err(|e| KeyVaultError::Corrupted(e.to_string()))?;
        let nonce =
            Nonce::from_slice(&nonce_bytes).map_err(|e| KeyVaultError::Corrupted(e.to_string()))?;
        Ok(SealedSecret { ciphertext, nonce })
    }
}
