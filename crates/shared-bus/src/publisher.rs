//! # Event Publisher
//!
//! Broadcast side of the bus. Every subscriber gets its own copy of each
//! event and filters on receipt.

use crate::events::{EventFilter, HubEvent};
use crate::subscriber::{EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Publishing side of the bus.
///
/// `publish` returns once the event is queued. It never waits for a
/// subscriber to process it.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Queue `event` for every live subscription. Returns how many received it.
    async fn publish(&self, event: HubEvent) -> usize;

    /// Events published since creation, delivered or not.
    fn events_published(&self) -> u64;
}

/// Process-local bus over `tokio::sync::broadcast`.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<HubEvent>,
    published: AtomicU64,
    /// Events published while nobody was subscribed.
    undelivered: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscriber before it lags.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
            undelivered: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching `filter`, from now on.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "[shared-bus] Subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events nobody was subscribed to receive.
    #[must_use]
    pub fn events_undelivered(&self) -> u64 {
        self.undelivered.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: HubEvent) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();
        let source = event.source_subsystem();

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(?topic, source, receivers, "[shared-bus] Event published");
                receivers
            }
            Err(broadcast::error::SendError(event)) => {
                self.undelivered.fetch_add(1, Ordering::Relaxed);
                warn!(?topic, source, ?event, "[shared-bus] Event published without subscribers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
