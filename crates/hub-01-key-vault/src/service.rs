//! # Key Vault Service
//!
//! Owns the hub wallet lifecycle: lazy creation, at-rest encryption and
//! personal-sign with per-call decryption.

use crate::domain::{KeyVaultError, StoredWallet, WalletOrigin};
use crate::ports::{AdminKeyProvider, KeyVaultApi, SecretCodec, WalletStore};
use async_trait::async_trait;
use shared_crypto::{RecoverableSignature, Secp256k1KeyPair};
use shared_types::Address;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

/// Key Vault configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVaultConfig {
    /// Upper bound on a single `sign` call.
    pub sign_timeout: Duration,
    /// Copy the admin wallet key into the first hub wallet when available.
    pub allow_admin_bootstrap: bool,
}

impl Default for KeyVaultConfig {
    fn default() -> Self {
        Self {
            sign_timeout: Duration::from_secs(10),
            allow_admin_bootstrap: true,
        }
    }
}

/// Key Vault service.
pub struct KeyVault<S: WalletStore, A: AdminKeyProvider, C: SecretCodec> {
    store: S,
    admin: A,
    codec: C,
    config: KeyVaultConfig,
    create_lock: Mutex<()>,
}

impl<S: WalletStore, A: AdminKeyProvider, C: SecretCodec> KeyVault<S, A, C> {
    /// Create a new Key Vault.
    pub fn new(store: S, admin: A, codec: C, config: KeyVaultConfig) -> Self {
        Self {
            store,
            admin,
            codec,
            config,
            create_lock: Mutex::new(()),
        }
    }

    /// Access the wallet store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn stored_address(wallet: &StoredWallet) -> Result<Address, KeyVaultError> {
        wallet.hub_address().ok_or_else(|| {
            KeyVaultError::Corrupted(format!("invalid stored address {}", wallet.address))
        })
    }

    async fn create_wallet(&self) -> Result<StoredWallet, KeyVaultError> {
        let bootstrap = if self.config.allow_admin_bootstrap {
            self.admin.bootstrap_key().await?
        } else {
            None
        };

        let (keypair, origin) = match bootstrap {
            Some(key) => (
                Secp256k1KeyPair::from_bytes(&key)?,
                WalletOrigin::BootstrappedFromAdmin,
            ),
            None => (Secp256k1KeyPair::generate(), WalletOrigin::Generated),
        };

        let secret = keypair.to_bytes();
        let sealed = self.codec.seal(secret.as_slice())?;
        let record = StoredWallet::new(keypair.address(), &sealed, origin);
        self.store.insert_if_absent(record).await
    }

    async fn sign_inner(&self, payload: &[u8]) -> Result<RecoverableSignature, KeyVaultError> {
        let wallet = self
            .store
            .load()
            .await?
            .ok_or(KeyVaultError::KeyUnavailable)?;
        let stored = Self::stored_address(&wallet)?;

        let plaintext = self.codec.open(&wallet.sealed()?).map_err(|e| {
            error!(address = %stored, "[hub-01] Hub wallet cannot be decrypted with the platform secret");
            KeyVaultError::DecryptionFailed(e.to_string())
        })?;
        let bytes: Zeroizing<[u8; 32]> = Zeroizing::new(
            plaintext
                .as_slice()
                .try_into()
                .map_err(|_| KeyVaultError::DecryptionFailed("unexpected key length".into()))?,
        );
        let keypair = Secp256k1KeyPair::from_bytes(&bytes)?;

        let derived = keypair.address();
        if derived != stored {
            error!(%stored, %derived, "[hub-01] Decrypted hub key does not match stored address");
            return Err(KeyVaultError::AddressMismatch { stored, derived });
        }

        Ok(keypair.sign_personal(payload)?)
    }
}

#[async_trait]
impl<S: WalletStore, A: AdminKeyProvider, C: SecretCodec> KeyVaultApi for KeyVault<S, A, C> {
    async fn get_or_create_address(&self) -> Result<Address, KeyVaultError> {
        if let Some(wallet) = self.store.load().await? {
            return Self::stored_address(&wallet);
        }

        let _guard = self.create_lock.lock().await;
        if let Some(wallet) = self.store.load().await? {
            return Self::stored_address(&wallet);
        }

        let wallet = self.create_wallet().await?;
        let address = Self::stored_address(&wallet)?;
        info!(%address, origin = ?wallet.origin, "[hub-01] Hub wallet created");
        Ok(address)
    }

    async fn address(&self) -> Result<Option<Address>, KeyVaultError> {
        match self.store.load().await? {
            Some(wallet) => Self::stored_address(&wallet).map(Some),
            None => Ok(None),
        }
    }

    async fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature, KeyVaultError> {
        let timeout = self.config.sign_timeout;
        match tokio::time::timeout(timeout, self.sign_inner(payload)).await {
            Ok(result) => {
                if result.is_ok() {
                    debug!(len = payload.len(), "[hub-01] Payload signed");
                }
                result
            }
            Err(_) => {
                warn!(?timeout, "[hub-01] Signing timed out");
                Err(KeyVaultError::Timeout(timeout))
            }
        }
    }
}
