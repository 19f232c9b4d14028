//! Tracing-backed [`SendObserver`].

use crate::domain::Trigger;
use crate::ports::SendObserver;
use hub_04_orchestrator::HubError;
use tracing::{error, info, warn};

/// Logs attempts: a `warn` per retried failure and one `error` when the
/// trigger gives up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SendObserver for LogObserver {
    fn attempt_started(&self, period_id: u64, attempt: u32, trigger: Trigger) {
        info!(period_id, attempt, %trigger, "[hub-05] Sending period report");
    }

    fn attempt_failed(&self, period_id: u64, attempt: u32, error: &HubError, fatal: bool) {
        if fatal {
            error!(
                period_id,
                attempt,
                code = error.code(),
                error = %error,
                "[hub-05] Automatic report send failed, giving up"
            );
        } else {
            warn!(
                period_id,
                attempt,
                code = error.code(),
                "[hub-05] Automatic report send failed, retrying"
            );
        }
    }

    fn report_sent(&self, period_id: u64, hash: &str, attempts: u32) {
        info!(period_id, hash, attempts, "[hub-05] Period report sent");
    }
}
