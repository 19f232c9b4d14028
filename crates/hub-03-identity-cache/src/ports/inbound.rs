//! # Inbound Ports
//!
//! API trait defining what the Identity Cache can do.

use crate::domain::IdentityCacheError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{Address, HubIdentity, UNKNOWN_DEED_ID};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Identity Cache API - inbound port.
///
/// Readers only ever see whole snapshots.
#[async_trait]
pub trait IdentityCacheApi: Send + Sync {
    /// Last fetched snapshot, no I/O.
    fn current(&self) -> Option<Arc<HubIdentity>>;

    /// Fetch the hub by its own address and replace the snapshot.
    ///
    /// A failed fetch keeps the previous snapshot.
    async fn refresh(&self) -> Result<Option<Arc<HubIdentity>>, IdentityCacheError>;

    /// Whether the cached membership is active now.
    fn is_connected(&self) -> bool {
        self.current().is_some_and(|hub| hub.is_connected())
    }

    /// Deed id of an active membership, `-1` otherwise.
    fn deed_id(&self) -> i64 {
        match self.current() {
            Some(hub) if hub.is_connected() => hub.deed_id,
            _ => UNKNOWN_DEED_ID,
        }
    }

    /// Deed manager of an active membership.
    fn deed_manager(&self) -> Option<Address> {
        self.current()
            .filter(|hub| hub.is_connected())
            .and_then(|hub| hub.deed_manager_address)
    }

    /// Join date of an active membership.
    fn join_date(&self) -> Option<DateTime<Utc>> {
        self.current()
            .filter(|hub| hub.is_connected())
            .and_then(|hub| hub.join_date)
    }

    /// Hub address of the cached snapshot, connected or not.
    fn hub_address(&self) -> Option<Address> {
        self.current().and_then(|hub| hub.address)
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock identity cache holding a settable snapshot.
#[derive(Default)]
pub struct MockIdentityCache {
    snapshot: RwLock<Option<Arc<HubIdentity>>>,
    refreshes: AtomicUsize,
    /// Snapshot installed by the next `refresh`, when set.
    pub next: RwLock<Option<Option<HubIdentity>>>,
}

impl MockIdentityCache {
    /// Cache holding `hub`.
    pub fn with_hub(hub: HubIdentity) -> Self {
        let cache = Self::default();
        cache.set(Some(hub));
        cache
    }

    /// Replace the snapshot.
    pub fn set(&self, hub: Option<HubIdentity>) {
        *self.snapshot.write() = hub.map(Arc::new);
    }

    /// Number of `refresh` calls.
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityCacheApi for MockIdentityCache {
    fn current(&self) -> Option<Arc<HubIdentity>> {
        self.snapshot.read().clone()
    }

    async fn refresh(&self) -> Result<Option<Arc<HubIdentity>>, IdentityCacheError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.next.write().take() {
            self.set(next);
        }
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_helpers_follow_connection_state() {
        let manager = Address::from_bytes([9; 20]);
        let cache = MockIdentityCache::with_hub(HubIdentity {
            deed_id: 5,
            connected: true,
            deed_manager_address: Some(manager),
            address: Some(Address::from_bytes([1; 20])),
            ..HubIdentity::default()
        });
        assert!(cache.is_connected());
        assert_eq!(cache.deed_id(), 5);
        assert_eq!(cache.deed_manager(), Some(manager));

        *cache.next.write() = Some(Some(HubIdentity {
            deed_id: 5,
            connected: false,
            address: Some(Address::from_bytes([1; 20])),
            ..HubIdentity::default()
        }));
        cache.refresh().await.unwrap();
        assert!(!cache.is_connected());
        assert_eq!(cache.deed_id(), UNKNOWN_DEED_ID);
        assert_eq!(cache.deed_manager(), None);
        assert_eq!(cache.hub_address(), Some(Address::from_bytes([1; 20])));
        assert_eq!(cache.refreshes(), 1);
    }
}
