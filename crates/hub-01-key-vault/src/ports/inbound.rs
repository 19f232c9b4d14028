//! # Inbound Ports
//!
//! API trait defining what the Key Vault can do.

use crate::domain::KeyVaultError;
use async_trait::async_trait;
use shared_crypto::RecoverableSignature;
use shared_types::Address;

/// Key Vault API - inbound port.
#[async_trait]
pub trait KeyVaultApi: Send + Sync {
    /// Return the hub address, creating the hub wallet on first call.
    ///
    /// Concurrent first calls create exactly one wallet and all observe the
    /// same address.
    async fn get_or_create_address(&self) -> Result<Address, KeyVaultError>;

    /// Return the hub address without creating anything.
    async fn address(&self) -> Result<Option<Address>, KeyVaultError>;

    /// Personal-sign `payload` with the hub key.
    ///
    /// The private key is decrypted for the duration of the call only.
    async fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature, KeyVaultError>;
}
