//! In-process adapters for the platform-side collaborators.
//!
//! The reward engine, user directory and deed oracle live outside the hub
//! federation layer. These adapters hold their answers in memory; the runtime
//! feeds them and tests script them.

use crate::domain::{HubCard, HubError};
use crate::ports::{DeedOracle, HubCardProvider, RewardReportProvider, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{DeedMetadata, RewardPeriod, RewardReport};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reward reports keyed by period id.
#[derive(Default)]
pub struct InMemoryRewardReports {
    reports: RwLock<BTreeMap<u64, RewardReport>>,
}

impl InMemoryRewardReports {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the report of its period.
    pub fn upsert(&self, report: RewardReport) {
        self.reports.write().insert(report.period.id, report);
    }
}

#[async_trait]
impl RewardReportProvider for InMemoryRewardReports {
    async fn report(&self, period_id: u64) -> Result<Option<RewardReport>, HubError> {
        Ok(self.reports.read().get(&period_id).cloned())
    }

    async fn period_at(&self, date: DateTime<Utc>) -> Result<Option<RewardPeriod>, HubError> {
        Ok(self
            .reports
            .read()
            .values()
            .map(|report| report.period.clone())
            .find(|period| period.contains(date)))
    }

    async fn periods(&self, offset: usize, limit: usize) -> Result<Vec<RewardPeriod>, HubError> {
        Ok(self
            .reports
            .read()
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .map(|report| report.period.clone())
            .collect())
    }
}

/// User directory answering a fixed count.
#[derive(Debug, Default)]
pub struct StaticUserDirectory {
    count: AtomicU64,
}

impl StaticUserDirectory {
    /// Directory with `count` enabled users.
    pub fn new(count: u64) -> Self {
        Self {
            count: AtomicU64::new(count),
        }
    }

    /// Change the user count.
    pub fn set(&self, count: u64) {
        self.count.store(count, Ordering::Relaxed);
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn active_users_count(&self) -> Result<u64, HubError> {
        Ok(self.count.load(Ordering::Relaxed))
    }
}

/// Hub card held in memory, replaced on portal setting changes.
#[derive(Default)]
pub struct StaticHubCard {
    card: RwLock<HubCard>,
}

impl StaticHubCard {
    /// Provider returning `card`.
    pub fn new(card: HubCard) -> Self {
        Self {
            card: RwLock::new(card),
        }
    }

    /// Replace the card.
    pub fn set(&self, card: HubCard) {
        *self.card.write() = card;
    }
}

#[async_trait]
impl HubCardProvider for StaticHubCard {
    async fn card(&self) -> Result<HubCard, HubError> {
        Ok(self.card.read().clone())
    }
}

/// Deed metadata keyed by deed id.
#[derive(Default)]
pub struct InMemoryDeedOracle {
    deeds: RwLock<BTreeMap<i64, DeedMetadata>>,
}

impl InMemoryDeedOracle {
    /// Empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the metadata of `deed_id`.
    pub fn insert(&self, deed_id: i64, deed: DeedMetadata) {
        self.deeds.write().insert(deed_id, deed);
    }
}

#[async_trait]
impl DeedOracle for InMemoryDeedOracle {
    async fn deed(&self, deed_id: i64) -> Result<Option<DeedMetadata>, HubError> {
        Ok(self.deeds.read().get(&deed_id).cloned())
    }
}
