//! REST handlers under `/api/hub`.
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | GET | `/api/hub?nftId=&forceRefresh=` | hub JSON or 404 |
//! | POST | `/api/hub` | hub address |
//! | DELETE | `/api/hub` | 204 |
//! | GET | `/api/hub/token` | token |
//! | GET | `/api/hub/manager?address=&nftId=` | `true` / `false` |
//! | GET | `/api/hub/deeds/{nftId}` | deed JSON or 404 |
//! | PUT | `/api/hub/avatar`, `/api/hub/banner` | 204 |
//! | GET | `/api/hub/reports?offset=&limit=` | report list |
//! | GET | `/api/hub/reports/{periodId}?refresh=` | report status or 404 |
//! | POST | `/api/hub/reports/{periodId}` | submitted report |

use crate::domain::{ApiError, EMPTY_CONNECTION_REQUEST, EMPTY_DISCONNECTION_REQUEST};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use hub_02_federation_client::{AssetKind, ConnectionRequest, DisconnectionRequest};
use hub_04_orchestrator::{HubApi, HubReportApi};
use serde::Deserialize;
use shared_types::{DeedMetadata, HubIdentity, HubReport, ReportLocalStatus};
use std::sync::Arc;

/// Page size when `limit` is omitted.
pub const DEFAULT_REPORTS_LIMIT: usize = 10;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Membership use cases.
    pub hub: Arc<dyn HubApi>,
    /// Report use cases.
    pub reports: Arc<dyn HubReportApi>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HubQuery {
    nft_id: Option<String>,
    force_refresh: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManagerQuery {
    #[serde(default)]
    address: String,
    nft_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReportsQuery {
    offset: Option<usize>,
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReportQuery {
    refresh: bool,
}

pub(crate) async fn health_check() -> &'static str {
    "OK"
}

pub(crate) async fn get_hub(
    State(state): State<AppState>,
    Query(query): Query<HubQuery>,
) -> Result<Json<HubIdentity>, ApiError> {
    let hub = match query.nft_id.as_deref().map(str::trim) {
        Some(nft_id) if !nft_id.is_empty() => {
            let deed_id = nft_id
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request("wom.invalidDeedId"))?;
            state.hub.hub_by_deed_id(deed_id).await?
        }
        _ => state
            .hub
            .hub(query.force_refresh)
            .await?
            .map(|hub| hub.as_ref().clone()),
    };
    hub.map(Json).ok_or_else(ApiError::not_found)
}

pub(crate) async fn connect(
    State(state): State<AppState>,
    body: Result<Json<ConnectionRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request(EMPTY_CONNECTION_REQUEST))?;
    let address = state.hub.connect(request).await?;
    Ok(address.to_string())
}

pub(crate) async fn disconnect(
    State(state): State<AppState>,
    body: Result<Json<DisconnectionRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request(EMPTY_DISCONNECTION_REQUEST))?;
    state.hub.disconnect(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn token(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.hub.generate_token().await?)
}

pub(crate) async fn is_deed_manager(
    State(state): State<AppState>,
    Query(query): Query<ManagerQuery>,
) -> Result<String, ApiError> {
    let manager = state
        .hub
        .is_deed_manager(&query.address, query.nft_id)
        .await?;
    Ok(manager.to_string())
}

pub(crate) async fn deed(
    State(state): State<AppState>,
    Path(nft_id): Path<i64>,
) -> Result<Json<DeedMetadata>, ApiError> {
    state
        .hub
        .deed(nft_id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub(crate) async fn upload_avatar(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    upload(state, AssetKind::Avatar, body).await
}

pub(crate) async fn upload_banner(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    upload(state, AssetKind::Banner, body).await
}

async fn upload(state: AppState, kind: AssetKind, body: Bytes) -> Result<StatusCode, ApiError> {
    state.hub.upload_asset(kind, body.to_vec()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn reports(
    State(state): State<AppState>,
    Query(query): Query<ReportsQuery>,
) -> Result<Json<Vec<ReportLocalStatus>>, ApiError> {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_REPORTS_LIMIT);
    Ok(Json(state.reports.reports(offset, limit).await?))
}

pub(crate) async fn report(
    State(state): State<AppState>,
    Path(period_id): Path<u64>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportLocalStatus>, ApiError> {
    state
        .reports
        .report(period_id, query.refresh)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub(crate) async fn send_report(
    State(state): State<AppState>,
    Path(period_id): Path<u64>,
) -> Result<Json<HubReport>, ApiError> {
    Ok(Json(state.reports.send_report(period_id).await?))
}
