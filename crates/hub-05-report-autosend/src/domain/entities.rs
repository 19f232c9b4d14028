//! # Auto-Send Entities
//!
//! Per-report send state machine, trigger kinds and outcomes.
//!
//! ```text
//! Pending ──start──▶ Sending ──ok──▶ Sent
//!                      │  ▲
//!                    fail │ retry (transient, attempts < max)
//!                      ▼  │
//!                     Failed ──(budget spent or fatal)──▶ terminal
//! ```

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Attempts per trigger, the first one included.
pub const MAX_SEND_ATTEMPTS: u32 = 3;

/// How recent a join must be for `HubConnected` to send a report.
pub const RECENT_JOIN_WINDOW_SECS: i64 = 3600;

/// The report sent after connecting covers the period this far before the join.
pub const CONNECT_LOOKBACK_DAYS: i64 = 7;

/// Error code of a send that ended before reaching a terminal state.
pub const INTERRUPTED_CODE: &str = "wom.sendInterrupted";

/// Coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSendConfig {
    /// Attempts per trigger.
    pub max_attempts: u32,
    /// Join recency required on `HubConnected`.
    pub join_window: Duration,
    /// Offset from the join date to the reported period.
    pub connect_lookback: Duration,
}

impl Default for AutoSendConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_SEND_ATTEMPTS,
            join_window: Duration::seconds(RECENT_JOIN_WINDOW_SECS),
            connect_lookback: Duration::days(CONNECT_LOOKBACK_DAYS),
        }
    }
}

impl AutoSendConfig {
    /// Date whose period is reported after joining on `join_date`.
    pub fn connect_report_date(&self, join_date: DateTime<Utc>) -> DateTime<Utc> {
        join_date - self.connect_lookback
    }
}

/// What started a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// The hub just joined the federation.
    HubConnected,
    /// The reward computation finished a period.
    RewardCompleted,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HubConnected => f.write_str("hub-connected"),
            Self::RewardCompleted => f.write_str("reward-completed"),
        }
    }
}

/// State of one report within one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    /// Not attempted yet.
    Pending,
    /// Attempt `attempt` in flight.
    Sending {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Accepted by the WoM server.
    Sent {
        /// Acknowledged report hash.
        hash: String,
        /// Attempts used.
        attempts: u32,
    },
    /// Last attempt failed.
    Failed {
        /// Attempts used.
        attempts: u32,
        /// Error code of the last attempt.
        error: String,
        /// Whether another attempt may succeed.
        retryable: bool,
    },
}

impl SendState {
    /// Number of the next attempt, `None` once terminal.
    pub fn next_attempt(&self, max_attempts: u32) -> Option<u32> {
        match self {
            Self::Pending => Some(1),
            Self::Failed {
                attempts,
                retryable: true,
                ..
            } if *attempts < max_attempts => Some(attempts + 1),
            _ => None,
        }
    }

    /// Start the next attempt. Terminal states are returned unchanged.
    pub fn start(self, max_attempts: u32) -> Self {
        match self.next_attempt(max_attempts) {
            Some(attempt) => Self::Sending { attempt },
            None => self,
        }
    }

    /// Record a successful attempt.
    pub fn succeed(self, hash: String) -> Self {
        match self {
            Self::Sending { attempt } => Self::Sent {
                hash,
                attempts: attempt,
            },
            other => other,
        }
    }

    /// Record a failed attempt.
    pub fn fail(self, error: String, retryable: bool) -> Self {
        match self {
            Self::Sending { attempt } => Self::Failed {
                attempts: attempt,
                error,
                retryable,
            },
            other => other,
        }
    }

    /// Whether no further attempt will be made.
    pub fn is_terminal(&self, max_attempts: u32) -> bool {
        !matches!(self, Self::Sending { .. }) && self.next_attempt(max_attempts).is_none()
    }

    /// Outcome of the trigger that ended in this state.
    pub fn into_outcome(self, period_id: u64) -> SendOutcome {
        match self {
            Self::Sent { hash, attempts } => SendOutcome::Sent {
                period_id,
                hash,
                attempts,
            },
            Self::Failed {
                attempts, error, ..
            } => SendOutcome::Failed {
                period_id,
                attempts,
                error,
            },
            Self::Pending => SendOutcome::Failed {
                period_id,
                attempts: 0,
                error: INTERRUPTED_CODE.to_string(),
            },
            Self::Sending { attempt } => SendOutcome::Failed {
                period_id,
                attempts: attempt,
                error: INTERRUPTED_CODE.to_string(),
            },
        }
    }
}

/// Why a trigger did not send anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `HubConnected` for a membership that is not active or not recent.
    NotRecentlyJoined,
    /// No reward period contains the report date.
    NoPeriod,
    /// The period report is missing or still being computed.
    NotReady,
    /// A report of the period was already accepted.
    AlreadySent,
}

/// Result of one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send.
    Skipped(SkipReason),
    /// Report accepted.
    Sent {
        /// Reported period.
        period_id: u64,
        /// Acknowledged report hash.
        hash: String,
        /// Attempts used.
        attempts: u32,
    },
    /// Attempts exhausted, or a non-retryable error.
    Failed {
        /// Reported period.
        period_id: u64,
        /// Attempts used.
        attempts: u32,
        /// Error code of the last attempt.
        error: String,
    },
}

impl SendOutcome {
    /// Number of submission attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Skipped(_) => 0,
            Self::Sent { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}
