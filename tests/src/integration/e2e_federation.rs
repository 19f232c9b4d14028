//! # Federation Flows
//!
//! Full node against a simulated WoM server:
//!
//! 1. **Connect → auto-send**: `HubConnected` makes the coordinator report
//!    the period containing `join_date - 7 days`.
//! 2. **Reward completed → auto-send**: transport failures are retried up to
//!    three attempts, WoM rejections are final.
//! 3. **Disconnect**: the snapshot is cleared and `HubDisconnected` published.

use super::fixtures::{
    accepted_report, disconnection_request, is_send_result, next_event, reward, Node, DEED_ID,
    REPORTS_PATH,
};
use chrono::{Duration, Utc};
use hub_03_identity_cache::IdentityCacheApi;
use hub_04_orchestrator::{HubApi, HubError, HubReportApi};
use hub_05_report_autosend::{AutoSendApi, SendOutcome, SkipReason};
use serde_json::json;
use shared_bus::{EventFilter, EventPublisher, EventTopic, FailureKind, HubEvent};
use shared_types::{HubReportStatus, RewardPeriodType};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn status_events(node: &Node) -> shared_bus::Subscription {
    node.container
        .bus
        .subscribe(EventFilter::topics(vec![EventTopic::ReportStatus]))
}

async fn mount_accepting_reports(node: &Node, hash: &str) {
    Mock::given(method("POST"))
        .and(path(REPORTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted_report(hash)))
        .mount(&node.server)
        .await;
}

/// Report submissions time out `times` times before the WoM server answers.
async fn mount_slow_reports(node: &Node, times: u64) {
    Mock::given(method("POST"))
        .and(path(REPORTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(2)))
        .up_to_n_times(times)
        .with_priority(1)
        .mount(&node.server)
        .await;
}

// =============================================================================
// CONNECT → AUTO-SEND
// =============================================================================

#[tokio::test]
async fn test_connect_sends_report_of_period_before_join() {
    let node = Node::start().await;
    let joined = Utc::now();
    // Contains join - 7 days and ends after the join date.
    node.container.platform.rewards.upsert(reward(
        1,
        RewardPeriodType::Month,
        joined - Duration::days(10),
        true,
    ));
    mount_accepting_reports(&node, "0xaccepted").await;
    let mut events = status_events(&node);

    let address = node.connect(joined).await;
    assert_eq!(address, node.address);

    match next_event(&mut events, is_send_result).await {
        HubEvent::ReportSent { period_id, hash } => {
            assert_eq!(period_id, 1);
            assert_eq!(hash, "0xaccepted");
        }
        other => panic!("expected ReportSent, got {other:?}"),
    }

    let submissions = node.report_requests().await;
    assert_eq!(submissions.len(), 1);
    let payload = &submissions[0]["payload"];
    assert_eq!(payload["deedId"], json!(DEED_ID));
    assert_eq!(payload["hubAddress"], json!(node.address.to_string()));
    assert_eq!(payload["participantsCount"], json!(12));
    let signature = submissions[0]["signature"].as_str().unwrap();
    assert!(signature.starts_with("0x"));
    assert_eq!(signature.len(), 2 + 65 * 2);

    assert!(node.container.reports.is_report_sent(1).await.unwrap());
    let local = node.container.reports.report(1, false).await.unwrap().unwrap();
    assert_eq!(local.report.status, HubReportStatus::Sent);
    assert_eq!(local.report.hash.as_deref(), Some("0xaccepted"));
    assert!(local.can_refresh);
    assert!(!local.can_send);
}

#[tokio::test]
async fn test_connect_does_not_report_period_ended_before_join() {
    let node = Node::start().await;
    let joined = Utc::now();
    // Weekly period containing join - 7 days ends before the join date.
    node.container.platform.rewards.upsert(reward(
        1,
        RewardPeriodType::Week,
        joined - Duration::days(8),
        true,
    ));
    mount_accepting_reports(&node, "0xaccepted").await;
    let mut events = status_events(&node);

    node.connect(joined).await;

    match next_event(&mut events, is_send_result).await {
        HubEvent::ReportSendFailed {
            period_id,
            attempts,
            error,
            kind,
        } => {
            assert_eq!(period_id, 1);
            assert_eq!(attempts, 1);
            assert_eq!(error, "wom.rewardBeforeJoinDate");
            assert_eq!(kind, FailureKind::Local);
        }
        other => panic!("expected ReportSendFailed, got {other:?}"),
    }
    assert!(node.report_requests().await.is_empty());
}

#[tokio::test]
async fn test_send_outdated_reports_period_before_join() {
    let node = Node::start_with(|config| config.reports.send_outdated = true).await;
    let joined = Utc::now();
    node.container.platform.rewards.upsert(reward(
        1,
        RewardPeriodType::Week,
        joined - Duration::days(8),
        true,
    ));
    mount_accepting_reports(&node, "0xoutdated").await;
    let mut events = status_events(&node);

    node.connect(joined).await;

    assert!(matches!(
        next_event(&mut events, is_send_result).await,
        HubEvent::ReportSent { period_id: 1, .. }
    ));
}

#[tokio::test]
async fn test_old_membership_does_not_trigger_report() {
    let node = Node::start().await;
    node.mount_member(Utc::now() - Duration::days(30)).await;
    node.container.identity.refresh().await.unwrap();

    let outcome = node.container.autosend.on_hub_connected().await.unwrap();
    assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NotRecentlyJoined));
}

// =============================================================================
// REWARD COMPLETED → AUTO-SEND
// =============================================================================

#[tokio::test]
async fn test_reward_completed_retries_unreachable_wom() {
    let node = Node::start().await;
    node.mount_member(Utc::now() - Duration::days(30)).await;
    node.container.identity.refresh().await.unwrap();
    node.container.platform.rewards.upsert(reward(
        2,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        true,
    ));
    mount_slow_reports(&node, 2).await;
    mount_accepting_reports(&node, "0xthird").await;
    let mut events = status_events(&node);

    node.container
        .bus
        .publish(HubEvent::RewardReportCompleted { period_id: 2 })
        .await;

    let progress = |event: &HubEvent| {
        matches!(event, HubEvent::ReportSending { .. }) || is_send_result(event)
    };
    let mut attempts = Vec::new();
    let mut event = next_event(&mut events, progress).await;
    while let HubEvent::ReportSending { attempt, .. } = event {
        attempts.push(attempt);
        event = next_event(&mut events, progress).await;
    }

    assert_eq!(attempts, vec![1, 2, 3]);
    assert_eq!(
        event,
        HubEvent::ReportSent {
            period_id: 2,
            hash: "0xthird".into()
        }
    );
    assert_eq!(node.report_requests().await.len(), 3);
    assert!(node.container.reports.is_report_sent(2).await.unwrap());
}

#[tokio::test]
async fn test_unreachable_wom_exhausts_attempts() {
    let node = Node::start().await;
    node.mount_member(Utc::now() - Duration::days(30)).await;
    node.container.identity.refresh().await.unwrap();
    node.container.platform.rewards.upsert(reward(
        2,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        true,
    ));
    mount_slow_reports(&node, 10).await;

    let outcome = node.container.autosend.on_reward_completed(2).await.unwrap();
    assert_eq!(
        outcome,
        SendOutcome::Failed {
            period_id: 2,
            attempts: 3,
            error: "wom.unavailable".into()
        }
    );

    let local = node.container.reports.report(2, false).await.unwrap().unwrap();
    assert_eq!(local.report.status, HubReportStatus::ErrorSending);
    assert!(local.can_send, "a failed report may be sent again");
}

#[tokio::test]
async fn test_rejected_report_is_not_retried() {
    let node = Node::start().await;
    node.mount_member(Utc::now() - Duration::days(30)).await;
    node.container.identity.refresh().await.unwrap();
    node.container.platform.rewards.upsert(reward(
        2,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        true,
    ));
    Mock::given(method("POST"))
        .and(path(REPORTS_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"messageKey":"wom.invalidSignature","message":"bad"}"#),
        )
        .mount(&node.server)
        .await;

    let outcome = node.container.autosend.on_reward_completed(2).await.unwrap();
    assert_eq!(
        outcome,
        SendOutcome::Failed {
            period_id: 2,
            attempts: 1,
            error: "wom.invalidSignature".into()
        }
    );
    assert_eq!(node.report_requests().await.len(), 1);
    assert!(!node.container.reports.is_report_sent(2).await.unwrap());
}

#[tokio::test]
async fn test_incomplete_or_sent_period_is_skipped() {
    let node = Node::start().await;
    node.mount_member(Utc::now() - Duration::days(30)).await;
    node.container.identity.refresh().await.unwrap();
    node.container.platform.rewards.upsert(reward(
        4,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        false,
    ));
    mount_accepting_reports(&node, "0xonce").await;

    let outcome = node.container.autosend.on_reward_completed(4).await.unwrap();
    assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NotReady));

    node.container.platform.rewards.upsert(reward(
        4,
        RewardPeriodType::Week,
        Utc::now() - Duration::days(3),
        true,
    ));
    assert!(matches!(
        node.container.autosend.on_reward_completed(4).await.unwrap(),
        SendOutcome::Sent { attempts: 1, .. }
    ));
    assert_eq!(
        node.container.autosend.on_reward_completed(4).await.unwrap(),
        SendOutcome::Skipped(SkipReason::AlreadySent)
    );
    assert_eq!(node.report_requests().await.len(), 1);
}

// =============================================================================
// DISCONNECT
// =============================================================================

#[tokio::test]
async fn test_disconnect_clears_membership() {
    let node = Node::start().await;
    node.connect(Utc::now()).await;
    assert!(node.container.identity.is_connected());

    node.server.reset().await;
    Mock::given(method("DELETE"))
        .and(path("/api/hubs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&node.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/hubs/{}", node.address)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&node.server)
        .await;
    let mut membership = node
        .container
        .bus
        .subscribe(EventFilter::topics(vec![EventTopic::Membership]));

    node.container
        .hub
        .disconnect(disconnection_request())
        .await
        .unwrap();

    let event = next_event(&mut membership, |event| {
        matches!(event, HubEvent::HubDisconnected { .. })
    })
    .await;
    assert_eq!(
        event,
        HubEvent::HubDisconnected {
            address: node.address
        }
    );
    assert!(!node.container.identity.is_connected());
    assert!(matches!(
        node.container.hub.disconnect(disconnection_request()).await,
        Err(HubError::AlreadyDisconnected)
    ));
}
