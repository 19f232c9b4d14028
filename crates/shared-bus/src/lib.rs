//! # Shared Bus - Event Bus for Hub Subsystems
//!
//! Domain events (hub connected, reward period completed, portal settings
//! changed) are published here and consumed by independent subscribers, so
//! the producer never waits on federation I/O.
//!
//! ## Delivery
//!
//! ```text
//! HubService ───HubConnected──────────┐
//! Platform ─────RewardReportCompleted─┼──▶ broadcast ──▶ Subscription (filter)
//! Auto-Send ────ReportSent────────────┘    (capacity)    recv() / try_recv()
//! ```
//!
//! Delivery is at most once per subscription. Events published before a
//! subscription exists are not replayed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{
    EventFilter, EventTopic, FailureKind, HubEvent, SOURCE_AUTOSEND, SOURCE_IDENTITY_CACHE,
    SOURCE_ORCHESTRATOR, SOURCE_PLATFORM,
};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Events buffered per subscription before the oldest are lost.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
