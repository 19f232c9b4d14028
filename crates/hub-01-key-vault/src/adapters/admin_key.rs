//! Administrative wallet key provider fed from configuration.

use crate::domain::KeyVaultError;
use crate::ports::AdminKeyProvider;
use async_trait::async_trait;
use zeroize::Zeroizing;

/// Admin key provider holding the key decoded from configuration.
#[derive(Default)]
pub struct StaticAdminKeyProvider {
    key: Option<Zeroizing<[u8; 32]>>,
}

impl StaticAdminKeyProvider {
    /// Provider with no admin wallet; the vault generates a fresh key.
    pub fn none() -> Self {
        Self::default()
    }

    /// Decode a hex private key, with or without `0x`. Blank input means none.
    pub fn from_hex(private_key: &str) -> Result<Self, KeyVaultError> {
        let trimmed = private_key.trim();
        if trimmed.is_empty() {
            return Ok(Self::none());
        }
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut key = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(digits, &mut key[..])
            .map_err(|e| KeyVaultError::AdminKey(e.to_string()))?;
        Ok(Self { key: Some(key) })
    }
}

#[async_trait]
impl AdminKeyProvider for StaticAdminKeyProvider {
    async fn bootstrap_key(&self) -> Result<Option<Zeroizing<[u8; 32]>>, KeyVaultError> {
        Ok(self.key.clone())
    }
}
