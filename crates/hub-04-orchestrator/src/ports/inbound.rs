//! # Inbound Ports
//!
//! Use cases exposed to the gateway and the auto-send coordinator.

use crate::domain::HubError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hub_02_federation_client::{AssetKind, ConnectionRequest, DisconnectionRequest};
use shared_types::{
    Address, DeedMetadata, HubIdentity, HubReport, HubReportPayload, ReportLocalStatus,
    RewardPeriod,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Hub membership use cases - inbound port.
#[async_trait]
pub trait HubApi: Send + Sync {
    /// Join the federation with a deed manager's signed proof.
    async fn connect(&self, request: ConnectionRequest) -> Result<Address, HubError>;

    /// Leave the federation.
    async fn disconnect(&self, request: DisconnectionRequest) -> Result<(), HubError>;

    /// Sign and submit a report payload once.
    async fn send_report(&self, payload: HubReportPayload) -> Result<HubReport, HubError>;

    /// Report known by the WoM server under `hash`.
    async fn report_by_hash(&self, hash: &str) -> Result<Option<HubReport>, HubError>;

    /// One-time token for a deed manager to sign.
    async fn generate_token(&self) -> Result<String, HubError>;

    /// Whether `address` manages deed `deed_id`. Blank addresses are never managers.
    async fn is_deed_manager(&self, address: &str, deed_id: i64) -> Result<bool, HubError>;

    /// Cached membership, refreshed first when `force_refresh`.
    async fn hub(&self, force_refresh: bool) -> Result<Option<Arc<HubIdentity>>, HubError>;

    /// Hub operating deed `deed_id`.
    async fn hub_by_deed_id(&self, deed_id: i64) -> Result<Option<HubIdentity>, HubError>;

    /// On-chain metadata of deed `deed_id`.
    async fn deed(&self, deed_id: i64) -> Result<Option<DeedMetadata>, HubError>;

    /// Upload a hub card image. Empty bytes are a no-op.
    async fn upload_asset(&self, kind: AssetKind, bytes: Vec<u8>) -> Result<(), HubError>;

    /// Push the current card images when connected.
    async fn sync_card_assets(&self) -> Result<(), HubError>;
}

/// Report use cases keyed by reward period id - inbound port.
#[async_trait]
pub trait HubReportApi: Send + Sync {
    /// Build, sign and submit the report of `period_id`, recording the outcome.
    async fn send_report(&self, period_id: u64) -> Result<HubReport, HubError>;

    /// Local view of a period report, or the remote one when `refresh`.
    async fn report(
        &self,
        period_id: u64,
        refresh: bool,
    ) -> Result<Option<ReportLocalStatus>, HubError>;

    /// Local views of a page of periods, most recent first.
    async fn reports(&self, offset: usize, limit: usize)
        -> Result<Vec<ReportLocalStatus>, HubError>;

    /// Whether a report of `period_id` was accepted.
    async fn is_report_sent(&self, period_id: u64) -> Result<bool, HubError>;

    /// Whether the period report is complete and may be submitted.
    async fn is_report_ready(&self, period_id: u64) -> Result<bool, HubError>;

    /// Reward period containing `date`.
    async fn period_at(&self, date: DateTime<Utc>) -> Result<Option<RewardPeriod>, HubError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scriptable report API for testing callers of [`HubReportApi`].
///
/// Periods listed as ready can be sent. `send_report` pops scripted errors
/// first, then succeeds and marks the period sent.
#[derive(Default)]
pub struct MockHubReportApi {
    ready: Mutex<BTreeMap<u64, RewardPeriod>>,
    sent: Mutex<BTreeSet<u64>>,
    failures: Mutex<VecDeque<HubError>>,
    send_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockHubReportApi {
    /// Empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose sends take `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Declare `period` complete and ready to send.
    pub fn add_ready_period(&self, period: RewardPeriod) {
        self.ready.lock().insert(period.id, period);
    }

    /// Mark `period_id` as already sent.
    pub fn mark_sent(&self, period_id: u64) {
        self.sent.lock().insert(period_id);
    }

    /// Make the next `send_report` calls fail with `errors`, in order.
    pub fn fail_next_sends(&self, errors: impl IntoIterator<Item = HubError>) {
        self.failures.lock().extend(errors);
    }

    /// Number of `send_report` calls.
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HubReportApi for MockHubReportApi {
    async fn send_report(&self, period_id: u64) -> Result<HubReport, HubError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        self.sent.lock().insert(period_id);
        Ok(HubReport {
            hash: Some(format!("0x{period_id:064x}")),
            ..HubReport::default()
        })
    }

    async fn report(
        &self,
        _period_id: u64,
        _refresh: bool,
    ) -> Result<Option<ReportLocalStatus>, HubError> {
        Ok(None)
    }

    async fn reports(
        &self,
        _offset: usize,
        _limit: usize,
    ) -> Result<Vec<ReportLocalStatus>, HubError> {
        Ok(Vec::new())
    }

    async fn is_report_sent(&self, period_id: u64) -> Result<bool, HubError> {
        Ok(self.sent.lock().contains(&period_id))
    }

    async fn is_report_ready(&self, period_id: u64) -> Result<bool, HubError> {
        Ok(self.ready.lock().contains_key(&period_id))
    }

    async fn period_at(&self, date: DateTime<Utc>) -> Result<Option<RewardPeriod>, HubError> {
        Ok(self
            .ready
            .lock()
            .values()
            .find(|period| period.contains(date))
            .cloned())
    }
}
