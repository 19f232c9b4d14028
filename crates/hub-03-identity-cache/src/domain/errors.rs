//! # Domain Errors
//!
//! Error types for the Identity Cache.

use hub_01_key_vault::KeyVaultError;
use hub_02_federation_client::FederationError;
use thiserror::Error;

/// Identity Cache error types.
#[derive(Debug, Error)]
pub enum IdentityCacheError {
    /// The hub address could not be read.
    #[error("Hub address lookup failed: {0}")]
    KeyVault(#[from] KeyVaultError),

    /// The WoM server could not be queried.
    #[error("Hub status lookup failed: {0}")]
    Federation(#[from] FederationError),
}

impl IdentityCacheError {
    /// Stable message key reported to API clients.
    pub fn code(&self) -> &str {
        match self {
            Self::KeyVault(e) => e.code(),
            Self::Federation(e) => e.code(),
        }
    }
}
