//! # Outbound Ports
//!
//! Attempt reporting. The runtime logs through [`crate::adapters::LogObserver`];
//! tests capture entries with [`RecordingObserver`].

use crate::domain::Trigger;
use hub_04_orchestrator::HubError;
use parking_lot::Mutex;

/// Receives every step of a send - outbound port.
pub trait SendObserver: Send + Sync {
    /// Attempt `attempt` of `period_id` is starting.
    fn attempt_started(&self, period_id: u64, attempt: u32, trigger: Trigger);

    /// Attempt `attempt` failed. `fatal` marks the last attempt of the trigger.
    fn attempt_failed(&self, period_id: u64, attempt: u32, error: &HubError, fatal: bool);

    /// The report was accepted after `attempts` attempts.
    fn report_sent(&self, period_id: u64, hash: &str, attempts: u32);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// One captured observer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// `attempt_started`.
    Attempt {
        /// Period.
        period_id: u64,
        /// Attempt number.
        attempt: u32,
    },
    /// Non-final `attempt_failed`, a warning.
    Warning {
        /// Period.
        period_id: u64,
        /// Error code.
        code: String,
    },
    /// Final `attempt_failed`, the fatal entry.
    Fatal {
        /// Period.
        period_id: u64,
        /// Error code.
        code: String,
    },
    /// `report_sent`.
    Sent {
        /// Period.
        period_id: u64,
        /// Report hash.
        hash: String,
    },
}

/// Observer capturing every call.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    entries: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, in order.
    pub fn entries(&self) -> Vec<Observed> {
        self.entries.lock().clone()
    }

    /// Number of attempts started.
    pub fn attempts(&self) -> usize {
        self.count(|e| matches!(e, Observed::Attempt { .. }))
    }

    /// Number of warning entries.
    pub fn warnings(&self) -> usize {
        self.count(|e| matches!(e, Observed::Warning { .. }))
    }

    /// Number of fatal entries.
    pub fn fatal_entries(&self) -> usize {
        self.count(|e| matches!(e, Observed::Fatal { .. }))
    }

    /// Number of accepted reports.
    pub fn sent(&self) -> usize {
        self.count(|e| matches!(e, Observed::Sent { .. }))
    }

    fn count(&self, predicate: impl Fn(&Observed) -> bool) -> usize {
        self.entries.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl SendObserver for RecordingObserver {
    fn attempt_started(&self, period_id: u64, attempt: u32, _trigger: Trigger) {
        self.entries
            .lock()
            .push(Observed::Attempt { period_id, attempt });
    }

    fn attempt_failed(&self, period_id: u64, _attempt: u32, error: &HubError, fatal: bool) {
        let code = error.code().to_string();
        let entry = if fatal {
            Observed::Fatal { period_id, code }
        } else {
            Observed::Warning { period_id, code }
        };
        self.entries.lock().push(entry);
    }

    fn report_sent(&self, period_id: u64, hash: &str, _attempts: u32) {
        self.entries.lock().push(Observed::Sent {
            period_id,
            hash: hash.to_string(),
        });
    }
}
