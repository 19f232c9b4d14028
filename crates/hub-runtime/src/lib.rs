//! # Meeds Hub Runtime
//!
//! Runs a hub as a member of the Web of Meeds federation.
//!
//! ## Modular Structure
//!
//! - `config` - TOML file and environment configuration
//! - `container/` - Subsystem construction in dependency order
//! - `adapters/` - Runtime port implementations (metrics decorator)
//! - `wiring/` - Event routing and bus handlers
//!
//! ## Event Flow
//!
//! ```text
//! HubService ──HubConnected/HubDisconnected──▶ Event Bus
//! Platform ────RewardReportCompleted─────────▶     │
//!                                                  ▼
//!                                            EventRouter
//!                       ┌──────────────────────┼──────────────────────┐
//!                       ▼                      ▼                      ▼
//!               AutoSendHandler        CardSyncHandler      ReportMetricsHandler
//!                       │
//!                       ▼
//!            ReportSending/ReportSent/ReportSendFailed ──▶ Event Bus
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then environment)
//! 2. Build subsystems
//! 3. Initialize the hub wallet
//! 4. Refresh the identity snapshot (failure is not fatal)
//! 5. Start the event router
//! 6. Start the gateway

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod container;
pub mod wiring;

use crate::wiring::{AutoSendHandler, CardSyncHandler, EventRouter, ReportMetricsHandler};
use anyhow::{Context, Result};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hub_03_identity_cache::IdentityCacheApi;
use hub_gateway::GatewayService;
use hub_telemetry::encode_metrics;
use shared_bus::EventFilter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

// Re-exports
pub use config::{ConfigError, HubConfig};
pub use container::{HubContainer, PlatformAdapters};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time given to background tasks to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The hub runtime orchestrating all subsystems.
pub struct HubRuntime {
    config: HubConfig,
    /// All initialized subsystems.
    container: Arc<HubContainer>,
    /// Topic lookup table for bus events.
    router: Arc<EventRouter>,
    /// Shutdown signal sender, shared with tasks that stop the hub on failure.
    shutdown_tx: Arc<watch::Sender<bool>>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl HubRuntime {
    /// Create a runtime talking to the configured WoM server.
    pub fn new(config: HubConfig) -> Result<Self> {
        info!("[hub-runtime] Creating hub runtime");
        let container = HubContainer::new(&config)?;
        Ok(Self::with_container(config, container))
    }

    /// Create a runtime around already built subsystems.
    pub fn with_container(config: HubConfig, container: HubContainer) -> Self {
        let container = Arc::new(container);

        let mut router = EventRouter::new();
        if config.autosend.enabled {
            router.register(Arc::new(AutoSendHandler::new(container.autosend.clone())));
        } else {
            info!("[hub-runtime] Report auto-send disabled");
        }
        router.register(Arc::new(CardSyncHandler::new(container.hub.clone())));
        router.register(Arc::new(ReportMetricsHandler));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            container,
            router: Arc::new(router),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    /// Start the runtime.
    ///
    /// Fails when the hub wallet cannot be initialized. An unreachable WoM
    /// server only leaves the identity snapshot empty.
    pub async fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Meeds Hub Runtime v{}", VERSION);
        info!("  WoM server: {}", self.config.wom.base_url);
        info!("===========================================");

        // Subscribe first so events published during startup are routed.
        let subscription = self.container.bus.subscribe(EventFilter::all());

        let address = self
            .container
            .key_vault
            .get_or_create_address()
            .await
            .context("Failed to initialize the hub wallet")?;
        info!(address = %address, "[hub-runtime] Hub wallet ready");

        match self.container.identity.refresh().await {
            Ok(Some(hub)) => info!(
                deed_id = hub.deed_id,
                connected = hub.connected,
                "[hub-runtime] Hub is a federation member"
            ),
            Ok(None) => info!("[hub-runtime] Hub is not connected to the federation"),
            Err(e) => warn!(error = %e, "[hub-runtime] Initial identity refresh failed"),
        }

        self.tasks.push(tokio::spawn(
            Arc::clone(&self.router).run(subscription, self.shutdown_rx.clone()),
        ));

        if self.config.gateway.enabled {
            let gateway = GatewayService::new(
                self.config.gateway.clone(),
                self.container.hub.clone(),
                self.container.reports.clone(),
            )?
            .with_routes(metrics_router());
            let shutdown_rx = self.shutdown_rx.clone();
            let shutdown_tx = Arc::clone(&self.shutdown_tx);
            self.tasks.push(tokio::spawn(async move {
                if let Err(e) = gateway.serve(shutdown_rx).await {
                    error!(error = %e, "[hub-gateway] Server failed");
                    let _ = shutdown_tx.send(true);
                }
            }));
        } else {
            info!("[hub-runtime] Gateway disabled");
        }

        info!(
            wallet = ?self.config.vault.wallet_path,
            reports = ?self.config.reports.store_path,
            "[hub-runtime] Hub runtime started"
        );
        Ok(())
    }

    /// Resolves once shutdown was requested.
    pub async fn stopped(&self) {
        let mut shutdown = self.shutdown_rx.clone();
        while !*shutdown.borrow_and_update() {
            if shutdown.changed().await.is_err() {
                return;
            }
        }
    }

    /// Shutdown the runtime gracefully.
    ///
    /// Signals every task, then waits up to five seconds for them to stop.
    pub async fn shutdown(&mut self) {
        info!("[hub-runtime] Initiating graceful shutdown...");
        let _ = self.shutdown_tx.send(true);

        for task in self.tasks.drain(..) {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "[hub-runtime] Task panicked"),
                Err(_) => warn!("[hub-runtime] Task did not stop in time"),
            }
        }
        info!("[hub-runtime] Shutdown complete");
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<HubContainer> {
        Arc::clone(&self.container)
    }

    /// Loaded configuration.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

/// Prometheus scrape endpoint.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics))
}

async fn metrics() -> Response {
    match encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "[hub-runtime] Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_02_federation_client::MockFederationClient;

    fn config(dir: &std::path::Path) -> HubConfig {
        let mut config = HubConfig::default();
        config.vault.wallet_path = dir.join("wallet.json");
        config.vault.platform_secret = "platform-secret".into();
        config.reports.store_path = dir.join("reports.json");
        config.gateway.enabled = false;
        config
    }

    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_start_creates_wallet_and_refreshes_identity() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let container =
            HubContainer::with_federation(&config, Arc::new(MockFederationClient::new())).unwrap();
        let mut runtime = HubRuntime::with_container(config, container);

        runtime.start().await.unwrap();
        assert!(runtime
            .container()
            .key_vault
            .address()
            .await
            .unwrap()
            .is_some());
        assert!(!runtime.container().identity.is_connected());

        runtime.shutdown().await;
        tokio::time::timeout(Duration::from_secs(1), runtime.stopped())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_wom_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let container =
            HubContainer::with_federation(&config, Arc::new(MockFederationClient::unavailable()))
                .unwrap();
        let mut runtime = HubRuntime::with_container(config, container);

        runtime.start().await.unwrap();
        assert!(runtime.container().identity.current().is_none());
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_metrics_route() {
        use tower::ServiceExt;

        hub_telemetry::register_metrics().unwrap();
        let response = metrics_router()
            .oneshot(
                axum::http::Request::get("/metrics")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
