//! # HUB-01 Key Vault
//!
//! Hub wallet custody: creation, encryption at rest, personal-sign.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every request the hub sends to the federation is signed with the hub
//! wallet. The vault:
//! - creates the wallet on first use (copying the admin wallet key when one exists)
//! - keeps the private key encrypted under the platform secret
//! - decrypts only for the duration of a `sign` call
//!
//! ## Security Properties
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Single wallet | double-checked create under a lock + `insert_if_absent` |
//! | At-rest secrecy | XChaCha20-Poly1305, key = keccak256(platform secret) |
//! | Integrity | derived address must equal the stored address |
//! | Bounded latency | `sign` is wrapped in a timeout |
//!
//! ## Module Structure
//!
//! ```text
//! hub-01-key-vault/
//! ├── domain/          # StoredWallet, SealedSecret, KeyVaultError
//! ├── ports/           # KeyVaultApi, WalletStore, AdminKeyProvider, SecretCodec
//! ├── adapters/        # File/in-memory stores, XChaCha codec, static admin key
//! └── service.rs       # KeyVault
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{FileWalletStore, InMemoryWalletStore, StaticAdminKeyProvider, XChaChaCodec};
pub use domain::{KeyVaultError, SealedSecret, StoredWallet, WalletOrigin};
pub use ports::{AdminKeyProvider, KeyVaultApi, MockAdminKeyProvider, SecretCodec, WalletStore};
pub use service::{KeyVault, KeyVaultConfig};

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
