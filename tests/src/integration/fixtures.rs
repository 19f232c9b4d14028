//! Test node: a started [`HubRuntime`] whose WoM server is a wiremock
//! [`MockServer`]. The hub wallet and report index live in a temp dir.

use chrono::{DateTime, Duration, Utc};
use hub_01_key_vault::KeyVaultApi;
use hub_02_federation_client::{ConnectionRequest, DisconnectionRequest};
use hub_runtime::{HubConfig, HubContainer, HubRuntime};
use serde_json::{json, Value};
use shared_bus::{HubEvent, Subscription};
use shared_types::{Address, RewardPeriod, RewardPeriodType, RewardReport};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DEED_ID: i64 = 3;
pub const MANAGER: &str = "0x1111111111111111111111111111111111111111";
pub const EARNER: &str = "0x2222222222222222222222222222222222222222";
pub const REPORTS_PATH: &str = "/api/hub/reports";

pub struct Node {
    pub server: MockServer,
    pub runtime: HubRuntime,
    pub container: Arc<HubContainer>,
    pub address: Address,
    _dir: TempDir,
}

impl Node {
    /// Start a node with the default test configuration.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start a node after `configure` adjusted its configuration.
    pub async fn start_with(configure: impl FnOnce(&mut HubConfig)) -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = HubConfig::default();
        config.wom.base_url = server.uri();
        config.wom.request_timeout = std::time::Duration::from_millis(500);
        config.wom.connect_timeout = std::time::Duration::from_millis(500);
        config.vault.wallet_path = dir.path().join("wallet.json");
        config.vault.platform_secret = "integration-secret".into();
        config.reports.store_path = dir.path().join("reports.json");
        config.gateway.enabled = false;
        configure(&mut config);

        // No mocks yet: the startup refresh sees an unknown hub.
        let mut runtime = HubRuntime::new(config).unwrap();
        runtime.start().await.unwrap();
        let container = runtime.container();
        let address = container.key_vault.address().await.unwrap().unwrap();

        Self {
            server,
            runtime,
            container,
            address,
            _dir: dir,
        }
    }

    /// Serve the hub membership, joined at `join_date`.
    pub async fn mount_member(&self, join_date: DateTime<Utc>) {
        Mock::given(method("GET"))
            .and(path(format!("/api/hubs/{}", self.address)))
            .respond_with(ResponseTemplate::new(200).set_body_json(hub_json(self.address, join_date)))
            .mount(&self.server)
            .await;
    }

    /// Accept connection requests.
    pub async fn mount_connect(&self) {
        Mock::given(method("POST"))
            .and(path("/api/hubs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("\"{}\"", self.address)))
            .mount(&self.server)
            .await;
    }

    /// Connect through the orchestrator with the WoM server accepting.
    pub async fn connect(&self, join_date: DateTime<Utc>) -> Address {
        use hub_04_orchestrator::HubApi;

        self.mount_connect().await;
        self.mount_member(join_date).await;
        self.container.hub.connect(connection_request()).await.unwrap()
    }

    /// Report submissions received by the WoM server.
    pub async fn report_requests(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == "POST" && request.url.path() == REPORTS_PATH)
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

pub fn hub_json(address: Address, join_date: DateTime<Utc>) -> Value {
    json!({
        "address": address.to_string(),
        "deedId": DEED_ID,
        "city": 1,
        "type": 2,
        "connected": true,
        "name": {"en": "Meeds Hub"},
        "joinDate": join_date.to_rfc3339(),
        "deedManagerAddress": MANAGER,
        "earnerAddress": EARNER
    })
}

/// Acknowledgement of an accepted report.
pub fn accepted_report(hash: &str) -> Value {
    json!({
        "hash": hash,
        "status": "SENT",
        "deedId": DEED_ID,
        "rewardId": "reward-1"
    })
}

pub fn connection_request() -> ConnectionRequest {
    ConnectionRequest {
        deed_id: DEED_ID,
        deed_manager_address: Some(MANAGER.into()),
        earner_address: Some(EARNER.into()),
        signed_message: Some("0xmanager-signature".into()),
        raw_message: Some("token-0".into()),
        token: Some("token-0".into()),
        ..ConnectionRequest::default()
    }
}

pub fn disconnection_request() -> DisconnectionRequest {
    DisconnectionRequest {
        deed_manager_address: Some(MANAGER.into()),
        signed_message: Some("0xmanager-signature".into()),
        raw_message: Some("token-1".into()),
        token: Some("token-1".into()),
        ..DisconnectionRequest::default()
    }
}

/// A reward computation starting at `start`. Months are 30 days long.
pub fn reward(
    id: u64,
    period_type: RewardPeriodType,
    start: DateTime<Utc>,
    completely_proceeded: bool,
) -> RewardReport {
    let length = match period_type {
        RewardPeriodType::Week => Duration::days(7),
        _ => Duration::days(30),
    };
    RewardReport {
        period: RewardPeriod {
            id,
            period_type,
            start,
            end: start + length,
        },
        completely_proceeded,
        participants_count: 12,
        recipients_count: 9,
        achievements_count: 40,
        actions_count: 55,
        hub_reward_amount: 120.5,
        ..RewardReport::default()
    }
}

/// Next event on `subscription` matching `predicate`, within five seconds.
pub async fn next_event(
    subscription: &mut Subscription,
    predicate: impl Fn(&HubEvent) -> bool,
) -> HubEvent {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        loop {
            match subscription.recv().await {
                Some(event) if predicate(&event) => return event,
                Some(_) => continue,
                None => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("timeout waiting for event")
}

/// Whether `event` ends a report send.
pub fn is_send_result(event: &HubEvent) -> bool {
    matches!(
        event,
        HubEvent::ReportSent { .. } | HubEvent::ReportSendFailed { .. }
    )
}
