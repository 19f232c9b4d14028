//! Report index adapters: in-memory and JSON file.

use crate::domain::{HubError, ReportRecord};
use crate::ports::ReportStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

type Index = BTreeMap<u64, ReportRecord>;

/// In-memory report index.
#[derive(Default)]
pub struct InMemoryReportStore {
    records: RwLock<Index>,
}

impl InMemoryReportStore {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn load(&self, period_id: u64) -> Result<Option<ReportRecord>, HubError> {
        Ok(self.records.read().get(&period_id).cloned())
    }

    async fn save(&self, period_id: u64, record: ReportRecord) -> Result<(), HubError> {
        self.records.write().insert(period_id, record);
        Ok(())
    }

    async fn clear(&self, period_id: u64) -> Result<(), HubError> {
        self.records.write().remove(&period_id);
        Ok(())
    }
}

/// JSON file report index, one map of period id to record.
///
/// The whole map is rewritten through a temp file on every change.
pub struct FileReportStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileReportStore {
    /// Keep the index at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Location of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Index, HubError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| HubError::Collaborator(format!("corrupted report index: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Index::new()),
            Err(e) => Err(HubError::Collaborator(e.to_string())),
        }
    }

    async fn write(&self, index: &Index) -> Result<(), HubError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HubError::Collaborator(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(index)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| HubError::Collaborator(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| HubError::Collaborator(e.to_string()))?;
        debug!(path = %self.path.display(), records = index.len(), "[hub-04] Report index written");
        Ok(())
    }

    async fn update(&self, change: impl FnOnce(&mut Index)) -> Result<(), HubError> {
        let _guard = self.write_lock.lock().await;
        let mut index = self.read().await?;
        change(&mut index);
        self.write(&index).await
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn load(&self, period_id: u64) -> Result<Option<ReportRecord>, HubError> {
        Ok(self.read().await?.remove(&period_id))
    }

    async fn save(&self, period_id: u64, record: ReportRecord) -> Result<(), HubError> {
        self.update(|index| {
            index.insert(period_id, record);
        })
        .await
    }

    async fn clear(&self, period_id: u64) -> Result<(), HubError> {
        self.update(|index| {
            index.remove(&period_id);
        })
        .await
    }
}
