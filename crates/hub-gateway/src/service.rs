//! Gateway service: router assembly and the HTTP server loop.

use crate::domain::{GatewayConfig, GatewayError};
use crate::middleware::AuthLayer;
use crate::routes::{self, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use hub_04_orchestrator::{HubApi, HubReportApi};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Local REST server over the orchestrator use cases.
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
    extra_routes: Router,
}

impl GatewayService {
    /// Create a gateway; fails when the configuration is invalid.
    pub fn new(
        config: GatewayConfig,
        hub: Arc<dyn HubApi>,
        reports: Arc<dyn HubReportApi>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self {
            config,
            state: AppState { hub, reports },
            extra_routes: Router::new(),
        })
    }

    /// Serve `routes` next to the API, without authentication.
    pub fn with_routes(mut self, routes: Router) -> Self {
        self.extra_routes = self.extra_routes.merge(routes);
        self
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        let api = Router::new()
            .route(
                "/api/hub",
                get(routes::get_hub)
                    .post(routes::connect)
                    .delete(routes::disconnect),
            )
            .route("/api/hub/token", get(routes::token))
            .route("/api/hub/manager", get(routes::is_deed_manager))
            .route("/api/hub/deeds/:nft_id", get(routes::deed))
            .route("/api/hub/avatar", put(routes::upload_avatar))
            .route("/api/hub/banner", put(routes::upload_banner))
            .route("/api/hub/reports", get(routes::reports))
            .route(
                "/api/hub/reports/:period_id",
                get(routes::report).post(routes::send_report),
            )
            .route_layer(AuthLayer::new(self.config.admin_token.clone()));

        Router::new()
            .route("/health", get(routes::health_check))
            .merge(api)
            .with_state(self.state.clone())
            .merge(self.extra_routes.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown` turns `true` or its sender is dropped.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> Result<(), GatewayError> {
        let addr = self.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        info!(addr = %addr, "[hub-gateway] Listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        info!("[hub-gateway] Stopped");
        Ok(())
    }
}
