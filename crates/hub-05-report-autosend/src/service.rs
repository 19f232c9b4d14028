//! # Report Auto-Send Service
//!
//! Sends a period report automatically after a fresh connection or a
//! finished reward computation, with a small retry budget.
//!
//! Check-and-send for a period runs under that period's async mutex: a
//! concurrent trigger for the same period waits, then sees the recorded hash
//! and skips.

use crate::adapters::LogObserver;
use crate::domain::{AutoSendConfig, AutoSendError, SendOutcome, SendState, SkipReason, Trigger};
use crate::ports::{AutoSendApi, SendObserver};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hub_03_identity_cache::IdentityCacheApi;
use hub_04_orchestrator::{HubError, HubReportApi};
use shared_bus::{EventPublisher, FailureKind, HubEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Report Auto-Send Coordinator.
pub struct ReportAutoSender {
    reports: Arc<dyn HubReportApi>,
    identity: Arc<dyn IdentityCacheApi>,
    observer: Arc<dyn SendObserver>,
    publisher: Option<Arc<dyn EventPublisher>>,
    config: AutoSendConfig,
    period_locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl ReportAutoSender {
    /// Create a coordinator logging through [`LogObserver`].
    pub fn new(
        reports: Arc<dyn HubReportApi>,
        identity: Arc<dyn IdentityCacheApi>,
        config: AutoSendConfig,
    ) -> Self {
        Self {
            reports,
            identity,
            observer: Arc::new(LogObserver),
            publisher: None,
            config,
            period_locks: DashMap::new(),
        }
    }

    /// Report attempts to `observer` instead of the log.
    pub fn with_observer(mut self, observer: Arc<dyn SendObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Publish report status events on `publisher`.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Coordinator settings.
    pub fn config(&self) -> &AutoSendConfig {
        &self.config
    }

    fn period_lock(&self, period_id: u64) -> Arc<Mutex<()>> {
        self.period_locks.entry(period_id).or_default().clone()
    }

    async fn publish(&self, event: HubEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event).await;
        }
    }

    /// Send the report of `period_id` unless it is not ready or already sent.
    pub async fn send_period(
        &self,
        period_id: u64,
        trigger: Trigger,
    ) -> Result<SendOutcome, AutoSendError> {
        let lock = self.period_lock(period_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.send_locked(period_id, trigger).await
        };
        drop(lock);
        // Waiters hold a clone, so the entry stays until the last one is done.
        self.period_locks
            .remove_if(&period_id, |_, lock| Arc::strong_count(lock) == 1);
        outcome
    }

    async fn send_locked(
        &self,
        period_id: u64,
        trigger: Trigger,
    ) -> Result<SendOutcome, AutoSendError> {
        if !self.reports.is_report_ready(period_id).await? {
            debug!(period_id, %trigger, "[hub-05] Period report not ready, skipping");
            return Ok(SendOutcome::Skipped(SkipReason::NotReady));
        }
        if self.reports.is_report_sent(period_id).await? {
            debug!(period_id, %trigger, "[hub-05] Period report already sent, skipping");
            return Ok(SendOutcome::Skipped(SkipReason::AlreadySent));
        }

        let max_attempts = self.config.max_attempts.max(1);
        let mut state = SendState::Pending;
        let mut last_failure = FailureKind::Interrupted;
        while let Some(attempt) = state.next_attempt(max_attempts) {
            state = state.start(max_attempts);
            self.observer.attempt_started(period_id, attempt, trigger);
            self.publish(HubEvent::ReportSending { period_id, attempt })
                .await;

            match self.reports.send_report(period_id).await {
                Ok(report) => {
                    let hash = report.hash.unwrap_or_default();
                    self.observer.report_sent(period_id, &hash, attempt);
                    state = state.succeed(hash);
                }
                Err(e) => {
                    last_failure = failure_kind(&e);
                    state = state.fail(e.code().to_string(), e.is_transient());
                    let fatal = state.is_terminal(max_attempts);
                    self.observer.attempt_failed(period_id, attempt, &e, fatal);
                }
            }
        }

        let outcome = state.into_outcome(period_id);
        match &outcome {
            SendOutcome::Sent { hash, .. } => {
                self.publish(HubEvent::ReportSent {
                    period_id,
                    hash: hash.clone(),
                })
                .await;
            }
            SendOutcome::Failed {
                attempts, error, ..
            } => {
                self.publish(HubEvent::ReportSendFailed {
                    period_id,
                    attempts: *attempts,
                    error: error.clone(),
                    kind: last_failure,
                })
                .await;
            }
            SendOutcome::Skipped(_) => {}
        }
        Ok(outcome)
    }
}

fn failure_kind(error: &HubError) -> FailureKind {
    if error.is_transient() {
        FailureKind::Unavailable
    } else if error.is_rejection() {
        FailureKind::Rejected
    } else {
        FailureKind::Local
    }
}

#[async_trait]
impl AutoSendApi for ReportAutoSender {
    async fn on_hub_connected(&self) -> Result<SendOutcome, AutoSendError> {
        let now = Utc::now();
        let join_date = self
            .identity
            .current()
            .filter(|hub| hub.is_connected_at(now) && hub.joined_within(self.config.join_window, now))
            .and_then(|hub| hub.join_date);
        let Some(join_date) = join_date else {
            debug!("[hub-05] Hub not freshly connected, no report to send");
            return Ok(SendOutcome::Skipped(SkipReason::NotRecentlyJoined));
        };

        let report_date = self.config.connect_report_date(join_date);
        match self.reports.period_at(report_date).await? {
            Some(period) => self.send_period(period.id, Trigger::HubConnected).await,
            None => {
                debug!(%report_date, "[hub-05] No reward period before the join date");
                Ok(SendOutcome::Skipped(SkipReason::NoPeriod))
            }
        }
    }

    async fn on_reward_completed(&self, period_id: u64) -> Result<SendOutcome, AutoSendError> {
        self.send_period(period_id, Trigger::RewardCompleted).await
    }
}
