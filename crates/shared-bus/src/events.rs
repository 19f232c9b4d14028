//! # Hub Events
//!
//! Defines all event types that flow through the shared bus. Each event is a
//! tagged variant; subscribers select what they need through `EventFilter`
//! and the runtime dispatches by `EventTopic`.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Source id for events raised by the surrounding platform.
pub const SOURCE_PLATFORM: u8 = 0;
/// Source id of the identity cache.
pub const SOURCE_IDENTITY_CACHE: u8 = 3;
/// Source id of the federation orchestrator.
pub const SOURCE_ORCHESTRATOR: u8 = 4;
/// Source id of the report auto-send coordinator.
pub const SOURCE_AUTOSEND: u8 = 5;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HubEvent {
    // =========================================================================
    // MEMBERSHIP
    // =========================================================================
    /// The hub completed a connection to the federation.
    /// Source: Orchestrator | Consumers: Auto-Send Coordinator
    HubConnected {
        /// Hub wallet address.
        address: Address,
        /// Deed the hub connected with.
        deed_id: i64,
    },

    /// The hub left the federation.
    HubDisconnected {
        /// Hub wallet address.
        address: Address,
    },

    /// The cached membership state changed after a refresh.
    /// Source: Identity Cache | Consumers: status observers
    HubStatusBroadcast {
        /// Whether the refreshed snapshot is an active membership.
        connected: bool,
        /// Deed id of the snapshot, `-1` when none.
        deed_id: i64,
    },

    // =========================================================================
    // PLATFORM
    // =========================================================================
    /// The reward computation finished a period.
    /// Source: Platform | Consumers: Auto-Send Coordinator
    RewardReportCompleted {
        /// Local id of the computed period.
        period_id: u64,
    },

    /// A portal setting shown on the hub card changed.
    PortalConfigUpdated {
        /// Name of the changed setting.
        setting: String,
    },

    // =========================================================================
    // REPORT STATUS (side channel)
    // =========================================================================
    /// A report submission attempt is starting.
    ReportSending {
        /// Period being reported.
        period_id: u64,
        /// 1-based attempt number.
        attempt: u32,
    },

    /// A report was accepted by the federation.
    ReportSent {
        /// Period reported.
        period_id: u64,
        /// Report hash acknowledged by the federation.
        hash: String,
    },

    /// A report submission exhausted its attempts.
    ReportSendFailed {
        /// Period that could not be reported.
        period_id: u64,
        /// Number of attempts made.
        attempts: u32,
        /// Last error code.
        error: String,
        /// Class of the last failure.
        kind: FailureKind,
    },
}

/// Bounded class of a report submission failure.
///
/// Error codes chosen by the WoM server are unbounded, so metrics and alerts
/// key on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The WoM server could not be reached.
    Unavailable,
    /// The WoM server refused the report.
    Rejected,
    /// Failed before or after the remote call (wallet, reward data, validation).
    Local,
    /// Stopped before any attempt completed.
    Interrupted,
}

impl FailureKind {
    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Rejected => "rejected",
            Self::Local => "local",
            Self::Interrupted => "interrupted",
        }
    }
}

impl HubEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::HubConnected { .. }
            | Self::HubDisconnected { .. }
            | Self::HubStatusBroadcast { .. } => EventTopic::Membership,
            Self::RewardReportCompleted { .. } => EventTopic::Rewards,
            Self::PortalConfigUpdated { .. } => EventTopic::Portal,
            Self::ReportSending { .. } | Self::ReportSent { .. } | Self::ReportSendFailed { .. } => {
                EventTopic::ReportStatus
            }
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::HubConnected { .. } | Self::HubDisconnected { .. } => SOURCE_ORCHESTRATOR,
            Self::HubStatusBroadcast { .. } => SOURCE_IDENTITY_CACHE,
            Self::RewardReportCompleted { .. } | Self::PortalConfigUpdated { .. } => {
                SOURCE_PLATFORM
            }
            Self::ReportSending { .. } | Self::ReportSent { .. } | Self::ReportSendFailed { .. } => {
                SOURCE_AUTOSEND
            }
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Connection state changes.
    Membership,
    /// Reward computation milestones.
    Rewards,
    /// Portal configuration changes.
    Portal,
    /// Report submission progress.
    ReportStatus,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &HubEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
