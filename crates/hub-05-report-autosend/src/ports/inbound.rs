//! # Inbound Ports
//!
//! Triggers accepted by the Report Auto-Send Coordinator.

use crate::domain::{AutoSendError, SendOutcome};
use async_trait::async_trait;
use shared_bus::HubEvent;

/// Auto-send API - inbound port.
#[async_trait]
pub trait AutoSendApi: Send + Sync {
    /// Send the report of the period before a fresh join.
    async fn on_hub_connected(&self) -> Result<SendOutcome, AutoSendError>;

    /// Send the report of a period whose reward computation finished.
    async fn on_reward_completed(&self, period_id: u64) -> Result<SendOutcome, AutoSendError>;

    /// Dispatch a bus event. `None` for events that are not triggers.
    async fn handle(&self, event: &HubEvent) -> Option<Result<SendOutcome, AutoSendError>> {
        match event {
            HubEvent::HubConnected { .. } => Some(self.on_hub_connected().await),
            HubEvent::RewardReportCompleted { period_id } => {
                Some(self.on_reward_completed(*period_id).await)
            }
            _ => None,
        }
    }
}
