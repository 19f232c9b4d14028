//! Report use cases keyed by reward period: build the payload from the
//! computed reward, submit it through [`HubApi`] and keep the local index.

use crate::domain::{
    build_payload, remote_local_status, HubError, LocalReportView, ReportRecord,
};
use crate::ports::{HubApi, HubReportApi, ReportStore, RewardReportProvider, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hub_03_identity_cache::IdentityCacheApi;
use shared_types::{HubReport, HubReportPayload, ReportLocalStatus, RewardPeriod, RewardReport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Collaborators of [`HubReportService`].
pub struct ReportDependencies {
    /// Signs and submits payloads.
    pub hub: Arc<dyn HubApi>,
    /// Membership snapshot: address, deed and join date.
    pub identity: Arc<dyn IdentityCacheApi>,
    /// Computed reward reports.
    pub rewards: Arc<dyn RewardReportProvider>,
    /// Enabled user count.
    pub users: Arc<dyn UserDirectory>,
    /// Per-period report index.
    pub store: Arc<dyn ReportStore>,
}

/// Report acceptance rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportPolicy {
    /// Accept periods that ended before the join date. Test networks only,
    /// the production WoM server refuses them.
    pub send_outdated: bool,
}

/// Period report service.
pub struct HubReportService {
    hub: Arc<dyn HubApi>,
    identity: Arc<dyn IdentityCacheApi>,
    rewards: Arc<dyn RewardReportProvider>,
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn ReportStore>,
    policy: ReportPolicy,
}

impl HubReportService {
    /// Create the service.
    pub fn new(deps: ReportDependencies, policy: ReportPolicy) -> Self {
        Self {
            hub: deps.hub,
            identity: deps.identity,
            rewards: deps.rewards,
            users: deps.users,
            store: deps.store,
            policy,
        }
    }

    /// Whether `period` may be reported: it ends after the join date.
    fn is_valid_date(&self, period: &RewardPeriod) -> bool {
        self.policy.send_outdated
            || self
                .identity
                .join_date()
                .is_some_and(|joined| joined < period.end)
    }

    async fn payload(
        &self,
        reward: &RewardReport,
        sent_date: Option<DateTime<Utc>>,
    ) -> Result<HubReportPayload, HubError> {
        let users_count = self.users.active_users_count().await?;
        Ok(build_payload(
            reward,
            self.identity.hub_address(),
            self.identity.deed_id(),
            users_count,
            sent_date,
        ))
    }

    async fn local_status(&self, reward: RewardReport) -> Result<ReportLocalStatus, HubError> {
        let period_id = reward.period.id;
        let record = self.store.load(period_id).await?.unwrap_or_default();
        let payload = self.payload(&reward, record.sent_date).await?;
        Ok(LocalReportView {
            period_id,
            payload,
            record: &record,
            completely_proceeded: reward.completely_proceeded,
            connected: self.identity.is_connected(),
            valid_date: self.is_valid_date(&reward.period),
        }
        .into_local_status())
    }

    /// Store `code` as the period status, keeping any acknowledged hash.
    async fn record_failure(&self, period_id: u64, code: &str) {
        let result = async {
            let mut record = self.store.load(period_id).await?.unwrap_or_default();
            record.status = Some(code.to_string());
            self.store.save(period_id, record).await
        }
        .await;
        if let Err(e) = result {
            warn!(period_id, code, error = %e, "[hub-04] Could not record report failure");
        }
    }

    async fn refresh_from_wom(&self, period_id: u64) -> Result<ReportLocalStatus, HubError> {
        let mut record = self
            .store
            .load(period_id)
            .await?
            .filter(ReportRecord::is_sent)
            .ok_or(HubError::ReportNotSent(period_id))?;
        let hash = record.hash.clone().unwrap_or_default();

        let remote = self.hub.report_by_hash(&hash).await?;
        let hub_address = self.identity.hub_address();
        let report = match remote {
            Some(report) if hub_address.is_some() && report.payload.hub_address == hub_address => {
                report
            }
            _ => {
                warn!(period_id, %hash, "[hub-04] Report unknown to WoM for this hub, clearing local record");
                self.store.clear(period_id).await?;
                return Err(HubError::ReportNotFoundInWom(period_id));
            }
        };

        record.status = Some(report.status.as_str().to_string());
        self.store.save(period_id, record).await?;
        debug!(period_id, status = %report.status.as_str(), "[hub-04] Report status refreshed");
        Ok(remote_local_status(period_id, report))
    }
}

#[async_trait]
impl HubReportApi for HubReportService {
    async fn send_report(&self, period_id: u64) -> Result<HubReport, HubError> {
        let reward = self
            .rewards
            .report(period_id)
            .await?
            .ok_or(HubError::ReportNotFound(period_id))?;
        if !self.identity.is_connected() {
            return Err(HubError::NotConnected);
        }
        if !reward.completely_proceeded {
            return Err(HubError::ReportNotComplete(period_id));
        }
        if !self.is_valid_date(&reward.period) {
            info!(period = %reward.period, "[hub-04] Period ends before the WoM join date, report not sent");
            return Err(HubError::ReportBeforeJoin(period_id));
        }

        let sent_date = self
            .store
            .load(period_id)
            .await?
            .and_then(|record| record.sent_date);
        let payload = self.payload(&reward, sent_date).await?;

        let start = Instant::now();
        info!(period = %reward.period, "[hub-04] Sending hub report to WoM");
        let report = match self.hub.send_report(payload).await {
            Ok(report) => report,
            Err(e) => {
                self.record_failure(period_id, e.code()).await;
                return Err(e);
            }
        };

        let rejection = report
            .error
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);
        if let Some(code) = rejection {
            self.record_failure(period_id, &code).await;
            return Err(HubError::ReportRejected { code });
        }

        let hash = report.hash.clone().unwrap_or_default();
        let sent = report.payload.sent_date.unwrap_or_else(Utc::now);
        self.store
            .save(period_id, ReportRecord::sent(hash.clone(), sent))
            .await?;
        info!(
            period_id,
            %hash,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "[hub-04] Hub report sent"
        );
        Ok(report)
    }

    async fn report(
        &self,
        period_id: u64,
        refresh: bool,
    ) -> Result<Option<ReportLocalStatus>, HubError> {
        if refresh {
            return self.refresh_from_wom(period_id).await.map(Some);
        }
        match self.rewards.report(period_id).await? {
            Some(reward) => self.local_status(reward).await.map(Some),
            None => Ok(None),
        }
    }

    async fn reports(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ReportLocalStatus>, HubError> {
        let periods = self.rewards.periods(offset, limit).await?;
        let mut statuses = Vec::with_capacity(periods.len());
        for period in periods {
            if let Some(reward) = self.rewards.report(period.id).await? {
                statuses.push(self.local_status(reward).await?);
            }
        }
        Ok(statuses)
    }

    async fn is_report_sent(&self, period_id: u64) -> Result<bool, HubError> {
        Ok(self
            .store
            .load(period_id)
            .await?
            .is_some_and(|record| record.is_sent()))
    }

    async fn is_report_ready(&self, period_id: u64) -> Result<bool, HubError> {
        Ok(self
            .rewards
            .report(period_id)
            .await?
            .is_some_and(|reward| reward.completely_proceeded))
    }

    async fn period_at(&self, date: DateTime<Utc>) -> Result<Option<RewardPeriod>, HubError> {
        self.rewards.period_at(date).await
    }
}
