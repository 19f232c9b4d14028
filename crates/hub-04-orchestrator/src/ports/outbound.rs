//! # Outbound Ports
//!
//! Local collaborators of the orchestrator: deed oracle, reward computation,
//! user directory, hub card source and the per-period report index.

use crate::domain::{HubCard, HubError, ReportRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{DeedMetadata, RewardPeriod, RewardReport};

/// Read-only blockchain oracle for deed metadata - outbound port.
#[async_trait]
pub trait DeedOracle: Send + Sync {
    /// Metadata of deed `deed_id`, `None` when the token does not exist.
    async fn deed(&self, deed_id: i64) -> Result<Option<DeedMetadata>, HubError>;
}

/// Reward computation - outbound port.
#[async_trait]
pub trait RewardReportProvider: Send + Sync {
    /// Computed report of period `period_id`.
    async fn report(&self, period_id: u64) -> Result<Option<RewardReport>, HubError>;

    /// Period containing `date`.
    async fn period_at(&self, date: DateTime<Utc>) -> Result<Option<RewardPeriod>, HubError>;

    /// A page of known periods, most recent first.
    async fn periods(&self, offset: usize, limit: usize) -> Result<Vec<RewardPeriod>, HubError>;
}

/// User directory - outbound port.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Number of enabled users of the hub.
    async fn active_users_count(&self) -> Result<u64, HubError>;
}

/// Source of the hub card shown in the federation - outbound port.
#[async_trait]
pub trait HubCardProvider: Send + Sync {
    /// Current card properties and images.
    async fn card(&self) -> Result<HubCard, HubError>;
}

/// Per-period report index - outbound port.
///
/// Records are written whole.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Record of `period_id`.
    async fn load(&self, period_id: u64) -> Result<Option<ReportRecord>, HubError>;

    /// Replace the record of `period_id`.
    async fn save(&self, period_id: u64, record: ReportRecord) -> Result<(), HubError>;

    /// Remove the record of `period_id`.
    async fn clear(&self, period_id: u64) -> Result<(), HubError>;
}
