//! # Event Subscriber
//!
//! Receiving side of the bus. A subscription that falls more than the bus
//! capacity behind loses the oldest events; the loss is counted and logged,
//! since a lost `RewardReportCompleted` means a report is not sent
//! automatically.

use crate::events::{EventFilter, HubEvent};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Event bus closed")]
    Closed,
}

/// Source of subscriptions.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching `filter`.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// Filtered stream of bus events.
pub struct Subscription {
    receiver: broadcast::Receiver<HubEvent>,
    filter: EventFilter,
    lost: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<HubEvent>, filter: EventFilter) -> Self {
        Self {
            receiver,
            filter,
            lost: 0,
        }
    }

    fn record_lag(&mut self, missed: u64) {
        self.lost += missed;
        warn!(
            missed,
            total = self.lost,
            topics = ?self.filter.topics,
            "[shared-bus] Subscriber lagged, events lost"
        );
    }

    /// Next matching event, `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<HubEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => self.record_lag(missed),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event if one is already queued.
    pub fn try_recv(&mut self) -> Result<Option<HubEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(missed)) => self.record_lag(missed),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
            }
        }
    }

    /// Filter of this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Events lost to lag so far.
    #[must_use]
    pub fn lost(&self) -> u64 {
        self.lost
    }
}
