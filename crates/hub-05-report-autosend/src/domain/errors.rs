//! # Domain Errors
//!
//! Error types for the Report Auto-Send Coordinator.

use hub_04_orchestrator::HubError;
use thiserror::Error;

/// Auto-send error types.
///
/// Submission failures are outcomes, not errors. These cover the lookups that
/// decide whether to send at all.
#[derive(Debug, Error)]
pub enum AutoSendError {
    /// Period or report state could not be read.
    #[error("Report lookup failed: {0}")]
    Lookup(#[from] HubError),
}

impl AutoSendError {
    /// Stable message key.
    pub fn code(&self) -> &str {
        match self {
            Self::Lookup(e) => e.code(),
        }
    }
}
