//! # Identity Cache Service
//!
//! Holds the hub's federation membership snapshot and refreshes it from the
//! WoM server by the hub's own address.

use crate::domain::{ConnectionChange, IdentityCacheError};
use crate::ports::IdentityCacheApi;
use async_trait::async_trait;
use chrono::Utc;
use hub_01_key_vault::KeyVaultApi;
use hub_02_federation_client::FederationClient;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, HubEvent};
use shared_types::{HubIdentity, UNKNOWN_DEED_ID};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Identity Cache service.
pub struct IdentityCache {
    key_vault: Arc<dyn KeyVaultApi>,
    federation: Arc<dyn FederationClient>,
    publisher: Option<Arc<dyn EventPublisher>>,
    snapshot: RwLock<Option<Arc<HubIdentity>>>,
    refresh_lock: Mutex<()>,
}

impl IdentityCache {
    /// Create an empty cache.
    pub fn new(key_vault: Arc<dyn KeyVaultApi>, federation: Arc<dyn FederationClient>) -> Self {
        Self {
            key_vault,
            federation,
            publisher: None,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Broadcast membership changes on `publisher`.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    fn swap(&self, next: Option<Arc<HubIdentity>>) -> Option<Arc<HubIdentity>> {
        std::mem::replace(&mut *self.snapshot.write(), next)
    }

    async fn broadcast(&self, change: ConnectionChange, next: Option<&HubIdentity>) {
        if change == ConnectionChange::Unchanged {
            return;
        }
        let connected = next.is_some_and(|hub| hub.is_connected());
        let deed_id = next.map_or(UNKNOWN_DEED_ID, |hub| hub.deed_id);
        info!(?change, connected, deed_id, "[hub-03] Hub membership changed");

        if let Some(publisher) = &self.publisher {
            publisher
                .publish(HubEvent::HubStatusBroadcast { connected, deed_id })
                .await;
        }
    }
}

#[async_trait]
impl IdentityCacheApi for IdentityCache {
    fn current(&self) -> Option<Arc<HubIdentity>> {
        self.snapshot.read().clone()
    }

    async fn refresh(&self) -> Result<Option<Arc<HubIdentity>>, IdentityCacheError> {
        let _guard = self.refresh_lock.lock().await;

        let next = match self.key_vault.address().await? {
            Some(address) => match self.federation.get_hub_by_address(&address).await {
                Ok(hub) => hub.map(Arc::new),
                Err(e) => {
                    warn!(%address, code = e.code(), "[hub-03] Hub refresh failed, keeping previous snapshot");
                    return Err(e.into());
                }
            },
            None => {
                debug!("[hub-03] No hub wallet yet, nothing to refresh");
                None
            }
        };

        let previous = self.swap(next.clone());
        let change = ConnectionChange::between(previous.as_deref(), next.as_deref(), Utc::now());
        self.broadcast(change, next.as_deref()).await;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_01_key_vault::{
        InMemoryWalletStore, KeyVault, KeyVaultConfig, MockAdminKeyProvider, XChaChaCodec,
    };
    use hub_02_federation_client::MockFederationClient;
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::Address;

    fn key_vault() -> Arc<dyn KeyVaultApi> {
        Arc::new(KeyVault::new(
            InMemoryWalletStore::new(),
            MockAdminKeyProvider::default(),
            XChaChaCodec::from_platform_secret("platform"),
            KeyVaultConfig::default(),
        ))
    }

    fn connected(address: Address, deed_id: i64) -> HubIdentity {
        HubIdentity {
            address: Some(address),
            deed_id,
            connected: true,
            ..HubIdentity::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_without_wallet_does_not_create_one() {
        let vault = key_vault();
        let federation = Arc::new(MockFederationClient::new());
        let cache = IdentityCache::new(vault.clone(), federation.clone());

        assert!(cache.refresh().await.unwrap().is_none());
        assert_eq!(vault.address().await.unwrap(), None);
        assert_eq!(federation.calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_swaps_snapshot() {
        let vault = key_vault();
        let address = vault.get_or_create_address().await.unwrap();
        let federation = Arc::new(MockFederationClient::new());
        federation.insert_hub(connected(address, 3));

        let cache = IdentityCache::new(vault, federation.clone());
        assert!(cache.current().is_none());

        let hub = cache.refresh().await.unwrap().unwrap();
        assert_eq!(hub.deed_id, 3);
        assert!(cache.is_connected());
        assert_eq!(cache.deed_id(), 3);
        assert_eq!(cache.hub_address(), Some(address));
    }

    #[tokio::test]
    async fn test_not_found_clears_snapshot() {
        let vault = key_vault();
        let address = vault.get_or_create_address().await.unwrap();
        let federation = Arc::new(MockFederationClient::new());
        federation.insert_hub(connected(address, 3));

        let cache = IdentityCache::new(vault, federation.clone());
        cache.refresh().await.unwrap();
        federation.remove_hub(&address);

        assert!(cache.refresh().await.unwrap().is_none());
        assert!(cache.current().is_none());
        assert!(!cache.is_connected());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let vault = key_vault();
        let address = vault.get_or_create_address().await.unwrap();
        let healthy = Arc::new(MockFederationClient::new());
        healthy.insert_hub(connected(address, 3));

        let cache = IdentityCache::new(vault.clone(), healthy);
        let before = cache.refresh().await.unwrap();

        let broken = IdentityCache {
            federation: Arc::new(MockFederationClient::unavailable()),
            ..cache
        };
        let error = broken.refresh().await.unwrap_err();
        assert!(matches!(error, IdentityCacheError::Federation(_)));
        assert_eq!(broken.current(), before);
        assert!(broken.is_connected());
    }

    #[tokio::test]
    async fn test_membership_change_is_broadcast() {
        let vault = key_vault();
        let address = vault.get_or_create_address().await.unwrap();
        let federation = Arc::new(MockFederationClient::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let mut subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Membership]));

        let cache = IdentityCache::new(vault, federation.clone()).with_publisher(bus.clone());
        cache.refresh().await.unwrap();
        assert!(subscription.try_recv().unwrap().is_none());

        federation.insert_hub(connected(address, 4));
        cache.refresh().await.unwrap();
        assert_eq!(
            subscription.try_recv().unwrap(),
            Some(HubEvent::HubStatusBroadcast {
                connected: true,
                deed_id: 4
            })
        );

        cache.refresh().await.unwrap();
        assert!(subscription.try_recv().unwrap().is_none());
    }
}
