//! # Outbound Ports
//!
//! Traits for the Key Vault's external dependencies: wallet persistence, the
//! administrative wallet and the platform codec.

use crate::domain::{KeyVaultError, SealedSecret, StoredWallet};
use async_trait::async_trait;
use shared_crypto::CryptoError;
use zeroize::Zeroizing;

/// Instance-local wallet persistence - outbound port.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Load the persisted wallet, if any.
    async fn load(&self) -> Result<Option<StoredWallet>, KeyVaultError>;

    /// Persist `wallet` unless one already exists.
    ///
    /// Returns the record that is stored once the call completes: `wallet`
    /// itself, or the earlier record that won.
    async fn insert_if_absent(&self, wallet: StoredWallet) -> Result<StoredWallet, KeyVaultError>;
}

/// Administrative wallet - outbound port.
///
/// Source of bootstrap key material for the first hub wallet.
#[async_trait]
pub trait AdminKeyProvider: Send + Sync {
    /// Decrypted admin private key, or `None` when no admin wallet exists.
    async fn bootstrap_key(&self) -> Result<Option<Zeroizing<[u8; 32]>>, KeyVaultError>;
}

/// Symmetric codec for key material at rest - outbound port.
pub trait SecretCodec: Send + Sync {
    /// Encrypt `plaintext`.
    fn seal(&self, plaintext: &[u8]) -> Result<SealedSecret, CryptoError>;

    /// Decrypt a sealed secret.
    fn open(&self, sealed: &SealedSecret) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock admin key provider for testing.
#[derive(Clone, Default)]
pub struct MockAdminKeyProvider {
    /// Key returned by `bootstrap_key`.
    pub key: Option<[u8; 32]>,
    /// Should fail?
    pub should_fail: bool,
}

#[async_trait]
impl AdminKeyProvider for MockAdminKeyProvider {
    async fn bootstrap_key(&self) -> Result<Option<Zeroizing<[u8; 32]>>, KeyVaultError> {
        if self.should_fail {
            return Err(KeyVaultError::AdminKey("Mock failure".to_string()));
        }
        Ok(self.key.map(Zeroizing::new))
    }
}
