//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the Key Vault's outbound ports.

mod admin_key;
mod codec;
mod wallet_store;

pub use admin_key::StaticAdminKeyProvider;
pub use codec::XChaChaCodec;
pub use wallet_store::{FileWalletStore, InMemoryWalletStore};
