//! Wallet store adapters: in-memory and JSON file.

use crate::domain::{KeyVaultError, StoredWallet};
use crate::ports::WalletStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// In-memory wallet store.
#[derive(Default)]
pub struct InMemoryWalletStore {
    wallet: Mutex<Option<StoredWallet>>,
    writes: AtomicUsize,
}

impl InMemoryWalletStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `wallet`.
    pub fn with_wallet(wallet: StoredWallet) -> Self {
        Self {
            wallet: Mutex::new(Some(wallet)),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of records actually written.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn load(&self) -> Result<Option<StoredWallet>, KeyVaultError> {
        Ok(self.wallet.lock().clone())
    }

    async fn insert_if_absent(&self, wallet: StoredWallet) -> Result<StoredWallet, KeyVaultError> {
        let mut slot = self.wallet.lock();
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        *slot = Some(wallet.clone());
        Ok(wallet)
    }
}

/// JSON file wallet store.
///
/// Writes go to a sibling temp file renamed over the target, so a crash
/// never leaves a half-written record.
pub struct FileWalletStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileWalletStore {
    /// Store the wallet at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Location of the wallet file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<StoredWallet>, KeyVaultError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KeyVaultError::Corrupted(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeyVaultError::Store(e.to_string())),
        }
    }
}

#[async_trait]
impl WalletStore for FileWalletStore {
    async fn load(&self) -> Result<Option<StoredWallet>, KeyVaultError> {
        self.read().await
    }

    async fn insert_if_absent(&self, wallet: StoredWallet) -> Result<StoredWallet, KeyVaultError> {
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.read().await? {
            return Ok(existing);
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| KeyVaultError::Store(e.to_string()))?;
        }
        let bytes =
            serde_json::to_vec_pretty(&wallet).map_err(|e| KeyVaultError::Store(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| KeyVaultError::Store(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| KeyVaultError::Store(e.to_string()))?;

        debug!(path = %self.path.display(), "[hub-01] Wallet record written");
        Ok(wallet)
    }
}
