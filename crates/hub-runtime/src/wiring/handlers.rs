//! Bus event handlers.
//!
//! | Handler | Topics | Action |
//! |---------|--------|--------|
//! | [`AutoSendHandler`] | Membership, Rewards | report submission triggers |
//! | [`CardSyncHandler`] | Portal | push the hub card images |
//! | [`ReportMetricsHandler`] | ReportStatus | Prometheus counters |

use async_trait::async_trait;
use hub_04_orchestrator::HubApi;
use hub_05_report_autosend::{AutoSendApi, SendOutcome};
use hub_telemetry::{metric_inc, REPORTS_SENT, REPORT_SEND_ATTEMPTS, REPORT_SEND_FAILURES};
use shared_bus::{EventTopic, HubEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Consumer of bus events, registered on topics.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Topics routed to this handler.
    fn topics(&self) -> &'static [EventTopic];

    /// Process one event. Failures are logged, never propagated.
    async fn handle(&self, event: HubEvent);
}

/// Forwards report triggers to the auto-send coordinator.
pub struct AutoSendHandler {
    sender: Arc<dyn AutoSendApi>,
}

impl AutoSendHandler {
    /// Create a handler driving `sender`.
    pub fn new(sender: Arc<dyn AutoSendApi>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EventHandler for AutoSendHandler {
    fn name(&self) -> &'static str {
        "autosend"
    }

    fn topics(&self) -> &'static [EventTopic] {
        &[EventTopic::Membership, EventTopic::Rewards]
    }

    async fn handle(&self, event: HubEvent) {
        match self.sender.handle(&event).await {
            None => {}
            Some(Ok(SendOutcome::Skipped(reason))) => {
                debug!(?reason, ?event, "[hub-runtime] Report trigger skipped");
            }
            Some(Ok(outcome)) => {
                debug!(?outcome, "[hub-runtime] Report trigger processed");
            }
            Some(Err(e)) => {
                warn!(error = %e, code = e.code(), ?event, "[hub-runtime] Report trigger failed");
            }
        }
    }
}

/// Pushes the hub card images when a portal setting changes.
pub struct CardSyncHandler {
    hub: Arc<dyn HubApi>,
}

impl CardSyncHandler {
    /// Create a handler syncing through `hub`.
    pub fn new(hub: Arc<dyn HubApi>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl EventHandler for CardSyncHandler {
    fn name(&self) -> &'static str {
        "card-sync"
    }

    fn topics(&self) -> &'static [EventTopic] {
        &[EventTopic::Portal]
    }

    async fn handle(&self, event: HubEvent) {
        let HubEvent::PortalConfigUpdated { setting } = event else {
            return;
        };
        match self.hub.sync_card_assets().await {
            Ok(()) => info!(%setting, "[hub-runtime] Hub card synchronized"),
            Err(e) => warn!(
                %setting,
                error = %e,
                code = e.code(),
                "[hub-runtime] Hub card synchronization failed"
            ),
        }
    }
}

/// Counts report submissions from status events.
#[derive(Debug, Default)]
pub struct ReportMetricsHandler;

#[async_trait]
impl EventHandler for ReportMetricsHandler {
    fn name(&self) -> &'static str {
        "report-metrics"
    }

    fn topics(&self) -> &'static [EventTopic] {
        &[EventTopic::ReportStatus]
    }

    async fn handle(&self, event: HubEvent) {
        match event {
            HubEvent::ReportSending { .. } => metric_inc!(REPORT_SEND_ATTEMPTS),
            HubEvent::ReportSent { .. } => metric_inc!(REPORTS_SENT),
            HubEvent::ReportSendFailed { kind, .. } => {
                metric_inc!(REPORT_SEND_FAILURES, &[kind.as_str()])
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::FailureKind;

    #[tokio::test]
    async fn test_report_metrics() {
        hub_telemetry::register_metrics().unwrap();
        let handler = ReportMetricsHandler;
        let attempts = REPORT_SEND_ATTEMPTS.get();
        let sent = REPORTS_SENT.get();
        let rejected = REPORT_SEND_FAILURES.with_label_values(&["rejected"]).get();

        handler
            .handle(HubEvent::ReportSending {
                period_id: 1,
                attempt: 1,
            })
            .await;
        handler
            .handle(HubEvent::ReportSent {
                period_id: 1,
                hash: "0x01".into(),
            })
            .await;
        handler
            .handle(HubEvent::ReportSendFailed {
                period_id: 2,
                attempts: 1,
                error: "wom.codeChosenByTheServer".into(),
                kind: FailureKind::Rejected,
            })
            .await;

        assert!(REPORT_SEND_ATTEMPTS.get() >= attempts + 1.0);
        assert!(REPORTS_SENT.get() >= sent + 1.0);
        assert!(REPORT_SEND_FAILURES.with_label_values(&["rejected"]).get() >= rejected + 1.0);

        let exposition = hub_telemetry::encode_metrics().unwrap();
        let kinds: Vec<&str> = exposition
            .lines()
            .filter(|line| line.starts_with("hub_report_send_failures_total{"))
            .filter_map(|line| line.split("kind=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert!(kinds.contains(&"rejected"));
        for kind in kinds {
            assert!(
                ["unavailable", "rejected", "local", "interrupted"].contains(&kind),
                "unexpected failure label {kind}"
            );
        }
    }
}
