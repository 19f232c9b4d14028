//! # Hub Container
//!
//! Builds every subsystem from [`HubConfig`] in dependency order:
//!
//! 1. Event bus
//! 2. Key Vault (file wallet, XChaCha20-Poly1305 at rest)
//! 3. Federation Client (HTTP, metrics decorator)
//! 4. Identity Cache
//! 5. Orchestrator: `HubService`, then `HubReportService`
//! 6. Report Auto-Send Coordinator
//!
//! The instance identity is one `Arc<IdentityCache>` handed to every
//! consumer through its constructor.

use crate::adapters::InstrumentedFederationClient;
use crate::config::{CardSettings, HubConfig};
use anyhow::{Context, Result};
use hub_01_key_vault::{
    FileWalletStore, KeyVault, KeyVaultApi, StaticAdminKeyProvider, XChaChaCodec,
};
use hub_02_federation_client::{FederationClient, HttpFederationClient};
use hub_03_identity_cache::IdentityCache;
use hub_04_orchestrator::{
    FileReportStore, HubCard, HubDependencies, HubReportService, HubService, InMemoryDeedOracle,
    InMemoryRewardReports, ReportDependencies, ReportPolicy, StaticHubCard, StaticUserDirectory,
};
use hub_05_report_autosend::ReportAutoSender;
use shared_bus::InMemoryEventBus;
use std::path::Path;
use std::sync::Arc;

/// Platform collaborators fed by the embedding application.
pub struct PlatformAdapters {
    /// Computed reward reports.
    pub rewards: Arc<InMemoryRewardReports>,
    /// Enabled user count.
    pub users: Arc<StaticUserDirectory>,
    /// Hub card properties.
    pub card: Arc<StaticHubCard>,
    /// Deed metadata.
    pub deeds: Arc<InMemoryDeedOracle>,
}

/// All initialized subsystems.
pub struct HubContainer {
    /// Event bus shared by publishers and the router.
    pub bus: Arc<InMemoryEventBus>,
    /// Hub wallet.
    pub key_vault: Arc<dyn KeyVaultApi>,
    /// WoM server client.
    pub federation: Arc<dyn FederationClient>,
    /// Membership snapshot.
    pub identity: Arc<IdentityCache>,
    /// Membership use cases.
    pub hub: Arc<HubService>,
    /// Report use cases.
    pub reports: Arc<HubReportService>,
    /// Automatic report submission.
    pub autosend: Arc<ReportAutoSender>,
    /// Platform collaborators.
    pub platform: PlatformAdapters,
}

impl HubContainer {
    /// Build every subsystem against the configured WoM server.
    pub fn new(config: &HubConfig) -> Result<Self> {
        let http = HttpFederationClient::new(&config.wom.client_config())
            .context("Failed to create the WoM HTTP client")?;
        let federation: Arc<dyn FederationClient> =
            Arc::new(InstrumentedFederationClient::new(Arc::new(http)));
        Self::with_federation(config, federation)
    }

    /// Build every subsystem around `federation`.
    pub fn with_federation(
        config: &HubConfig,
        federation: Arc<dyn FederationClient>,
    ) -> Result<Self> {
        let bus = Arc::new(InMemoryEventBus::new());

        let admin = StaticAdminKeyProvider::from_hex(&config.vault.admin_private_key)
            .context("Invalid vault.admin_private_key")?;
        let key_vault: Arc<dyn KeyVaultApi> = Arc::new(KeyVault::new(
            FileWalletStore::new(&config.vault.wallet_path),
            admin,
            XChaChaCodec::from_platform_secret(&config.vault.platform_secret),
            config.vault.key_vault_config(),
        ));

        let identity = Arc::new(
            IdentityCache::new(key_vault.clone(), federation.clone()).with_publisher(bus.clone()),
        );

        let platform = PlatformAdapters {
            rewards: Arc::new(InMemoryRewardReports::new()),
            users: Arc::new(StaticUserDirectory::new(0)),
            card: Arc::new(StaticHubCard::new(load_card(&config.card)?)),
            deeds: Arc::new(InMemoryDeedOracle::new()),
        };

        let hub = Arc::new(
            HubService::new(HubDependencies {
                key_vault: key_vault.clone(),
                federation: federation.clone(),
                identity: identity.clone(),
                card: platform.card.clone(),
                deeds: platform.deeds.clone(),
            })
            .with_publisher(bus.clone()),
        );

        let reports = Arc::new(HubReportService::new(
            ReportDependencies {
                hub: hub.clone(),
                identity: identity.clone(),
                rewards: platform.rewards.clone(),
                users: platform.users.clone(),
                store: Arc::new(FileReportStore::new(&config.reports.store_path)),
            },
            ReportPolicy {
                send_outdated: config.reports.send_outdated,
            },
        ));

        let autosend = Arc::new(
            ReportAutoSender::new(
                reports.clone(),
                identity.clone(),
                config.autosend.autosend_config(),
            )
            .with_publisher(bus.clone()),
        );

        Ok(Self {
            bus,
            key_vault,
            federation,
            identity,
            hub,
            reports,
            autosend,
            platform,
        })
    }
}

fn load_card(settings: &CardSettings) -> Result<HubCard> {
    Ok(HubCard {
        name: settings.name.clone(),
        description: settings.description.clone(),
        url: settings.url.clone(),
        color: settings.color.clone(),
        avatar: read_image(settings.avatar_path.as_deref())?,
        banner: read_image(settings.banner_path.as_deref())?,
    })
}

fn read_image(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    path.map(|path| {
        std::fs::read(path).with_context(|| format!("Failed to read card image {}", path.display()))
    })
    .transpose()
}
