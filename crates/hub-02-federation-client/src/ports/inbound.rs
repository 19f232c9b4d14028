//! # Inbound Ports
//!
//! API trait defining the calls the hub makes to the WoM server.

use crate::domain::{
    AssetUpload, ConnectionRequest, DisconnectionRequest, FederationError, ReportSubmission,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, HubIdentity, HubReport};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Federation Client API - inbound port.
///
/// One call is one HTTP exchange. Nothing is retried here.
#[async_trait]
pub trait FederationClient: Send + Sync {
    /// Hub registered under `address`, `None` when unknown.
    async fn get_hub_by_address(
        &self,
        address: &Address,
    ) -> Result<Option<HubIdentity>, FederationError>;

    /// Hub operating deed `deed_id`, `None` when unknown.
    async fn get_hub_by_deed_id(&self, deed_id: i64)
        -> Result<Option<HubIdentity>, FederationError>;

    /// Whether `address` manages deed `deed_id`.
    async fn is_deed_manager(&self, address: &str, deed_id: i64) -> Result<bool, FederationError>;

    /// One-time token to be signed by a deed manager or the hub.
    async fn generate_token(&self) -> Result<String, FederationError>;

    /// Join the federation; returns the registered hub address.
    async fn connect(&self, request: &ConnectionRequest) -> Result<Address, FederationError>;

    /// Leave the federation.
    async fn disconnect(&self, request: &DisconnectionRequest) -> Result<(), FederationError>;

    /// Submit a signed report.
    async fn submit_report(&self, submission: &ReportSubmission)
        -> Result<HubReport, FederationError>;

    /// Report stored under `hash`, `None` when unknown.
    async fn get_report_by_hash(&self, hash: &str) -> Result<Option<HubReport>, FederationError>;

    /// Upload a hub card image.
    async fn upload_asset(&self, upload: AssetUpload) -> Result<(), FederationError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scriptable in-memory federation client for testing.
///
/// Hubs and reports live in maps. `submit_report` pops scripted failures
/// before answering from its own state.
#[derive(Default)]
pub struct MockFederationClient {
    hubs: Mutex<HashMap<Address, HubIdentity>>,
    reports: Mutex<HashMap<String, HubReport>>,
    submit_failures: Mutex<VecDeque<FederationError>>,
    last_connection: Mutex<Option<ConnectionRequest>>,
    last_disconnection: Mutex<Option<DisconnectionRequest>>,
    uploads: Mutex<Vec<AssetUpload>>,
    managers: Mutex<HashMap<i64, String>>,
    calls: AtomicUsize,
    submit_calls: AtomicUsize,
    should_fail: bool,
    fail_uploads: bool,
    lose_membership_responses: bool,
}

impl MockFederationClient {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose every call fails with `Unavailable`.
    pub fn unavailable() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Mock whose asset uploads are rejected.
    pub fn with_failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    /// Mock that applies connect and disconnect, then answers `Unavailable`
    /// as if the response was lost after the server processed the request.
    pub fn with_lost_membership_responses() -> Self {
        Self {
            lose_membership_responses: true,
            ..Self::default()
        }
    }

    fn membership_response<T>(&self, value: T) -> Result<T, FederationError> {
        if self.lose_membership_responses {
            return Err(FederationError::Unavailable("response lost".to_string()));
        }
        Ok(value)
    }

    /// Register a hub.
    pub fn insert_hub(&self, hub: HubIdentity) {
        if let Some(address) = hub.address {
            self.hubs.lock().insert(address, hub);
        }
    }

    /// Remove a hub.
    pub fn remove_hub(&self, address: &Address) {
        self.hubs.lock().remove(address);
    }

    /// Register a report under its hash.
    pub fn insert_report(&self, hash: impl Into<String>, report: HubReport) {
        self.reports.lock().insert(hash.into(), report);
    }

    /// Declare `address` as manager of `deed_id`.
    pub fn set_manager(&self, deed_id: i64, address: impl Into<String>) {
        self.managers.lock().insert(deed_id, address.into());
    }

    /// Make the next `submit_report` calls fail with `errors`, in order.
    pub fn fail_next_submits(&self, errors: impl IntoIterator<Item = FederationError>) {
        self.submit_failures.lock().extend(errors);
    }

    /// Total calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `submit_report` calls made, including failed ones.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Last connection request received.
    pub fn last_connection(&self) -> Option<ConnectionRequest> {
        self.last_connection.lock().clone()
    }

    /// Last disconnection request received.
    pub fn last_disconnection(&self) -> Option<DisconnectionRequest> {
        self.last_disconnection.lock().clone()
    }

    /// Uploads received.
    pub fn uploads(&self) -> Vec<AssetUpload> {
        self.uploads.lock().clone()
    }

    fn enter(&self) -> Result<(), FederationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(FederationError::Unavailable("Mock failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FederationClient for MockFederationClient {
    async fn get_hub_by_address(
        &self,
        address: &Address,
    ) -> Result<Option<HubIdentity>, FederationError> {
        self.enter()?;
        Ok(self.hubs.lock().get(address).cloned())
    }

    async fn get_hub_by_deed_id(
        &self,
        deed_id: i64,
    ) -> Result<Option<HubIdentity>, FederationError> {
        self.enter()?;
        Ok(self
            .hubs
            .lock()
            .values()
            .find(|hub| hub.deed_id == deed_id)
            .cloned())
    }

    async fn is_deed_manager(&self, address: &str, deed_id: i64) -> Result<bool, FederationError> {
        self.enter()?;
        Ok(self
            .managers
            .lock()
            .get(&deed_id)
            .is_some_and(|manager| manager.eq_ignore_ascii_case(address)))
    }

    async fn generate_token(&self) -> Result<String, FederationError> {
        self.enter()?;
        Ok(format!("token-{}", self.calls()))
    }

    async fn connect(&self, request: &ConnectionRequest) -> Result<Address, FederationError> {
        self.enter()?;
        *self.last_connection.lock() = Some(request.clone());
        let address = request.address.ok_or_else(|| FederationError::Rejected {
            code: "wom.emptyHubAddress".into(),
            status: 400,
        })?;
        self.hubs.lock().insert(
            address,
            HubIdentity {
                address: Some(address),
                deed_id: request.deed_id,
                connected: true,
                join_date: Some(chrono::Utc::now()),
                name: request.name.clone(),
                description: request.description.clone(),
                url: request.url.clone(),
                color: request.color.clone(),
                ..HubIdentity::default()
            },
        );
        self.membership_response(address)
    }

    async fn disconnect(&self, request: &DisconnectionRequest) -> Result<(), FederationError> {
        self.enter()?;
        *self.last_disconnection.lock() = Some(request.clone());
        if let Some(address) = request.hub_address {
            if let Some(hub) = self.hubs.lock().get_mut(&address) {
                hub.connected = false;
            }
        }
        self.membership_response(())
    }

    async fn submit_report(
        &self,
        submission: &ReportSubmission,
    ) -> Result<HubReport, FederationError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.enter()?;
        if let Some(error) = self.submit_failures.lock().pop_front() {
            return Err(error);
        }
        let report = HubReport {
            hash: Some(submission.hash.clone()),
            signature: Some(submission.signature.clone()),
            ..HubReport::from_payload(
                submission.payload.clone(),
                shared_types::HubReportStatus::Sent,
            )
        };
        self.reports
            .lock()
            .insert(submission.hash.clone(), report.clone());
        Ok(report)
    }

    async fn get_report_by_hash(&self, hash: &str) -> Result<Option<HubReport>, FederationError> {
        self.enter()?;
        Ok(self.reports.lock().get(hash).cloned())
    }

    async fn upload_asset(&self, upload: AssetUpload) -> Result<(), FederationError> {
        self.enter()?;
        if self.fail_uploads {
            return Err(FederationError::Rejected {
                code: "wom.uploadFailed".into(),
                status: 500,
            });
        }
        self.uploads.lock().push(upload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::HubReportPayload;

    #[tokio::test]
    async fn test_mock_connect_registers_hub() {
        let mock = MockFederationClient::new();
        let address = Address::from_bytes([5; 20]);
        let request = ConnectionRequest {
            deed_id: 7,
            address: Some(address),
            ..Default::default()
        };

        assert_eq!(mock.connect(&request).await.unwrap(), address);
        let hub = mock.get_hub_by_address(&address).await.unwrap().unwrap();
        assert!(hub.is_connected());
        assert_eq!(mock.get_hub_by_deed_id(7).await.unwrap(), Some(hub));
    }

    #[tokio::test]
    async fn test_mock_scripted_submit_failures() {
        let mock = MockFederationClient::new();
        mock.fail_next_submits([FederationError::Unavailable("down".into())]);
        let submission = ReportSubmission {
            hash: "0xabc".into(),
            signature: "0xsig".into(),
            payload: HubReportPayload::default(),
        };

        assert!(mock.submit_report(&submission).await.is_err());
        let report = mock.submit_report(&submission).await.unwrap();
        assert_eq!(report.hash.as_deref(), Some("0xabc"));
        assert_eq!(mock.submit_calls(), 2);
        assert!(mock.get_report_by_hash("0xabc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mock_lost_membership_response_still_applies() {
        let mock = MockFederationClient::with_lost_membership_responses();
        let address = Address::from_bytes([5; 20]);
        let request = ConnectionRequest {
            deed_id: 7,
            address: Some(address),
            ..Default::default()
        };

        assert!(matches!(
            mock.connect(&request).await,
            Err(FederationError::Unavailable(_))
        ));
        let hub = mock.get_hub_by_address(&address).await.unwrap().unwrap();
        assert!(hub.is_connected());
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let mock = MockFederationClient::unavailable();
        assert!(matches!(
            mock.generate_token().await,
            Err(FederationError::Unavailable(_))
        ));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_manager_check_ignores_case() {
        let mock = MockFederationClient::new();
        mock.set_manager(3, "0xAbC");
        assert!(mock.is_deed_manager("0xabc", 3).await.unwrap());
        assert!(!mock.is_deed_manager("0xabc", 4).await.unwrap());
    }
}
