//! Federation client decorator recording Prometheus metrics.

use async_trait::async_trait;
use hub_02_federation_client::{
    AssetUpload, ConnectionRequest, DisconnectionRequest, FederationClient, FederationError,
    ReportSubmission,
};
use hub_telemetry::{FEDERATION_REQUESTS, FEDERATION_REQUEST_DURATION, OUTCOME_OK};
use shared_types::{Address, HubIdentity, HubReport};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Counts every WoM call by operation and outcome, and times it.
pub struct InstrumentedFederationClient {
    inner: Arc<dyn FederationClient>,
}

impl InstrumentedFederationClient {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn FederationClient>) -> Self {
        Self { inner }
    }

    async fn record<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, FederationError>>,
    ) -> Result<T, FederationError> {
        let started = Instant::now();
        let result = call.await;
        FEDERATION_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());
        FEDERATION_REQUESTS
            .with_label_values(&[operation, outcome(&result)])
            .inc();
        result
    }
}

/// Bounded outcome label: remote message keys are not used as label values.
fn outcome<T>(result: &Result<T, FederationError>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_OK,
        Err(FederationError::Unavailable(_)) => "unavailable",
        Err(FederationError::Rejected { .. }) => "rejected",
        Err(FederationError::InvalidResponse(_) | FederationError::Encoding(_)) => {
            "invalid_response"
        }
    }
}

#[async_trait]
impl FederationClient for InstrumentedFederationClient {
    async fn get_hub_by_address(
        &self,
        address: &Address,
    ) -> Result<Option<HubIdentity>, FederationError> {
        self.record("get_hub_by_address", self.inner.get_hub_by_address(address))
            .await
    }

    async fn get_hub_by_deed_id(
        &self,
        deed_id: i64,
    ) -> Result<Option<HubIdentity>, FederationError> {
        self.record("get_hub_by_deed_id", self.inner.get_hub_by_deed_id(deed_id))
            .await
    }

    async fn is_deed_manager(&self, address: &str, deed_id: i64) -> Result<bool, FederationError> {
        self.record("is_deed_manager", self.inner.is_deed_manager(address, deed_id))
            .await
    }

    async fn generate_token(&self) -> Result<String, FederationError> {
        self.record("generate_token", self.inner.generate_token()).await
    }

    async fn connect(&self, request: &ConnectionRequest) -> Result<Address, FederationError> {
        self.record("connect", self.inner.connect(request)).await
    }

    async fn disconnect(&self, request: &DisconnectionRequest) -> Result<(), FederationError> {
        self.record("disconnect", self.inner.disconnect(request)).await
    }

    async fn submit_report(
        &self,
        submission: &ReportSubmission,
    ) -> Result<HubReport, FederationError> {
        self.record("submit_report", self.inner.submit_report(submission))
            .await
    }

    async fn get_report_by_hash(&self, hash: &str) -> Result<Option<HubReport>, FederationError> {
        self.record("get_report_by_hash", self.inner.get_report_by_hash(hash))
            .await
    }

    async fn upload_asset(&self, upload: AssetUpload) -> Result<(), FederationError> {
        self.record("upload_asset", self.inner.upload_asset(upload)).await
    }
}
