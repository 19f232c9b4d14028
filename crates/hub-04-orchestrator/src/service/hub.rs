//! Hub membership use cases: connect, disconnect, signed report submission
//! and hub card image uploads.

use crate::domain::{validate_connection, validate_disconnection, HubError};
use crate::ports::{DeedOracle, HubApi, HubCardProvider};
use async_trait::async_trait;
use hub_01_key_vault::KeyVaultApi;
use hub_02_federation_client::{
    AssetKind, AssetUpload, ConnectionRequest, DisconnectionRequest, FederationClient, HubSigned,
    ReportSubmission,
};
use hub_03_identity_cache::IdentityCacheApi;
use shared_bus::{EventPublisher, HubEvent};
use shared_types::{Address, DeedMetadata, HubIdentity, HubReport, HubReportPayload};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collaborators of [`HubService`].
pub struct HubDependencies {
    /// Hub wallet.
    pub key_vault: Arc<dyn KeyVaultApi>,
    /// WoM server.
    pub federation: Arc<dyn FederationClient>,
    /// Membership snapshot, refreshed after every membership change.
    pub identity: Arc<dyn IdentityCacheApi>,
    /// Card properties sent on connect.
    pub card: Arc<dyn HubCardProvider>,
    /// Deed metadata lookups.
    pub deeds: Arc<dyn DeedOracle>,
}

/// Federation membership service.
pub struct HubService {
    key_vault: Arc<dyn KeyVaultApi>,
    federation: Arc<dyn FederationClient>,
    identity: Arc<dyn IdentityCacheApi>,
    card: Arc<dyn HubCardProvider>,
    deeds: Arc<dyn DeedOracle>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl HubService {
    /// Create the service.
    pub fn new(deps: HubDependencies) -> Self {
        Self {
            key_vault: deps.key_vault,
            federation: deps.federation,
            identity: deps.identity,
            card: deps.card,
            deeds: deps.deeds,
            publisher: None,
        }
    }

    /// Announce membership changes on `publisher`.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// The identity cache this service refreshes.
    pub fn identity(&self) -> &Arc<dyn IdentityCacheApi> {
        &self.identity
    }

    async fn sign_request<R: HubSigned>(&self, request: &mut R) -> Result<(), HubError> {
        let bytes = request.signing_bytes()?;
        let signature = self.key_vault.sign(&bytes).await?;
        request.set_hub_signed_message(Some(signature.to_hex()));
        Ok(())
    }

    /// Refresh the identity cache, keeping the old snapshot on failure.
    async fn refresh_identity(&self) -> Option<Arc<HubIdentity>> {
        match self.identity.refresh().await {
            Ok(hub) => hub,
            Err(e) => {
                warn!(code = e.code(), "[hub-04] Identity refresh after membership change failed");
                self.identity.current()
            }
        }
    }

    async fn publish(&self, event: HubEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event).await;
        }
    }

    async fn upload(
        &self,
        address: Address,
        kind: AssetKind,
        bytes: Vec<u8>,
    ) -> Result<(), HubError> {
        if bytes.is_empty() {
            debug!(%kind, "[hub-04] Empty hub card image, nothing to upload");
            return Ok(());
        }
        let token = self.federation.generate_token().await?;
        let signature = self.key_vault.sign(token.as_bytes()).await?;
        let size = bytes.len();
        self.federation
            .upload_asset(AssetUpload {
                kind,
                hub_address: address,
                signed_message: signature.to_hex(),
                raw_message: token.clone(),
                token,
                bytes,
            })
            .await?;
        info!(%address, %kind, size, "[hub-04] Hub card image uploaded");
        Ok(())
    }
}

#[async_trait]
impl HubApi for HubService {
    async fn connect(&self, mut request: ConnectionRequest) -> Result<Address, HubError> {
        validate_connection(&request)?;

        let address = self.key_vault.get_or_create_address().await?;
        let card = self.card.card().await?;
        request.address = Some(address);
        request.name = card.name_map();
        request.description = card.description_map();
        request.url = card.url.clone();
        request.color = card.color.clone();
        self.sign_request(&mut request).await?;

        info!(%address, deed_id = request.deed_id, "[hub-04] Connecting hub to WoM");
        let result = self.federation.connect(&request).await;

        if result.is_ok() {
            if let Some(avatar) = card.avatar {
                if let Err(e) = self.upload(address, AssetKind::Avatar, avatar).await {
                    warn!(%address, code = e.code(), "[hub-04] Avatar upload after connect failed");
                }
            }
        }
        self.refresh_identity().await;

        let connected = result?;
        info!(address = %connected, deed_id = request.deed_id, "[hub-04] Hub connected");
        self.publish(HubEvent::HubConnected {
            address: connected,
            deed_id: request.deed_id,
        })
        .await;
        Ok(connected)
    }

    async fn disconnect(&self, mut request: DisconnectionRequest) -> Result<(), HubError> {
        validate_disconnection(&request)?;
        if !self.identity.is_connected() {
            return Err(HubError::AlreadyDisconnected);
        }

        let address = self.identity.hub_address();
        request.hub_address = address;
        self.sign_request(&mut request).await?;

        info!(address = ?address, "[hub-04] Disconnecting hub from WoM");
        let result = self.federation.disconnect(&request).await;
        self.refresh_identity().await;
        result?;

        if let Some(address) = address {
            self.publish(HubEvent::HubDisconnected { address }).await;
        }
        info!(address = ?address, "[hub-04] Hub disconnected");
        Ok(())
    }

    async fn send_report(&self, payload: HubReportPayload) -> Result<HubReport, HubError> {
        let bytes = ReportSubmission::signing_bytes(&payload)?;
        let signature = self.key_vault.sign(&bytes).await?;
        let submission = ReportSubmission::new(payload, &signature);

        debug!(hash = %submission.hash, "[hub-04] Submitting report");
        let mut report = self.federation.submit_report(&submission).await?;
        report.hash.get_or_insert(submission.hash);
        report.signature.get_or_insert(submission.signature);
        Ok(report)
    }

    async fn report_by_hash(&self, hash: &str) -> Result<Option<HubReport>, HubError> {
        Ok(self.federation.get_report_by_hash(hash).await?)
    }

    async fn generate_token(&self) -> Result<String, HubError> {
        Ok(self.federation.generate_token().await?)
    }

    async fn is_deed_manager(&self, address: &str, deed_id: i64) -> Result<bool, HubError> {
        if address.trim().is_empty() {
            return Ok(false);
        }
        Ok(self.federation.is_deed_manager(address, deed_id).await?)
    }

    async fn hub(&self, force_refresh: bool) -> Result<Option<Arc<HubIdentity>>, HubError> {
        if force_refresh {
            Ok(self.identity.refresh().await?)
        } else {
            Ok(self.identity.current())
        }
    }

    async fn hub_by_deed_id(&self, deed_id: i64) -> Result<Option<HubIdentity>, HubError> {
        Ok(self.federation.get_hub_by_deed_id(deed_id).await?)
    }

    async fn deed(&self, deed_id: i64) -> Result<Option<DeedMetadata>, HubError> {
        self.deeds.deed(deed_id).await
    }

    async fn upload_asset(&self, kind: AssetKind, bytes: Vec<u8>) -> Result<(), HubError> {
        let address = self
            .identity
            .hub_address()
            .ok_or(HubError::NotConnected)?;
        self.upload(address, kind, bytes).await
    }

    async fn sync_card_assets(&self) -> Result<(), HubError> {
        let Some(address) = self
            .identity
            .current()
            .filter(|hub| hub.is_connected())
            .and_then(|hub| hub.address)
        else {
            debug!("[hub-04] Hub not connected, card images not synchronized");
            return Ok(());
        };

        let card = self.card.card().await?;
        for (kind, bytes) in [
            (AssetKind::Avatar, card.avatar),
            (AssetKind::Banner, card.banner),
        ] {
            if let Some(bytes) = bytes {
                self.upload(address, kind, bytes).await?;
            }
        }
        Ok(())
    }
}
