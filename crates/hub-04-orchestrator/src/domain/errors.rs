//! # Domain Errors
//!
//! Error types for the Federation Orchestrator.

use hub_01_key_vault::KeyVaultError;
use hub_02_federation_client::FederationError;
use hub_03_identity_cache::IdentityCacheError;
use thiserror::Error;

/// Orchestrator error types.
#[derive(Debug, Error)]
pub enum HubError {
    /// A required request field is missing. Never retried.
    #[error("Invalid request: {code}")]
    Validation {
        /// Message key naming the missing field.
        code: &'static str,
    },

    /// Disconnect requested while not connected.
    #[error("Hub is already disconnected")]
    AlreadyDisconnected,

    /// Operation requires an active federation membership.
    #[error("Hub is not connected")]
    NotConnected,

    /// No reward report exists for the period.
    #[error("No reward report for period {0}")]
    ReportNotFound(u64),

    /// The reward computation of the period is still running.
    #[error("Reward of period {0} is not completely proceeded")]
    ReportNotComplete(u64),

    /// The period ended before the hub joined the federation.
    #[error("Reward period {0} ends before the hub join date")]
    ReportBeforeJoin(u64),

    /// The period report was never sent.
    #[error("Report of period {0} was not sent")]
    ReportNotSent(u64),

    /// The WoM server has no report for this hub under the stored hash.
    #[error("Report of period {0} not found on the WoM server")]
    ReportNotFoundInWom(u64),

    /// The WoM server answered with a report carrying an error.
    #[error("Report rejected: {code}")]
    ReportRejected {
        /// Remote message key.
        code: String,
    },

    /// Signed payload could not be encoded.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// A local collaborator (reward reports, directory, storage) failed.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Hub wallet failure.
    #[error(transparent)]
    KeyVault(#[from] KeyVaultError),

    /// WoM server failure.
    #[error(transparent)]
    Federation(#[from] FederationError),

    /// Identity refresh failure.
    #[error(transparent)]
    Identity(#[from] IdentityCacheError),
}

impl HubError {
    /// Stable message key reported to API clients.
    pub fn code(&self) -> &str {
        match self {
            Self::Validation { code } => code,
            Self::AlreadyDisconnected => "wom.alreadyDisconnected",
            Self::NotConnected => "wom.notConnected",
            Self::ReportNotFound(_) => "wom.unableToRetrieveReward",
            Self::ReportNotComplete(_) => "wom.rewardNotCompletelyProceeded",
            Self::ReportBeforeJoin(_) => "wom.rewardBeforeJoinDate",
            Self::ReportNotSent(_) => "wom.notSentReward",
            Self::ReportNotFoundInWom(_) => "wom.rewardNotFoundInWom",
            Self::ReportRejected { code } => code,
            Self::Encoding(_) => "wom.encodingError",
            Self::Collaborator(_) => "wom.unknownError",
            Self::KeyVault(e) => e.code(),
            Self::Federation(e) => e.code(),
            Self::Identity(e) => e.code(),
        }
    }

    /// Whether the WoM server answered and refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ReportRejected { .. }
                | Self::Federation(FederationError::Rejected { .. })
                | Self::Identity(IdentityCacheError::Federation(
                    FederationError::Rejected { .. }
                ))
        )
    }

    /// Whether a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Federation(e) => e.is_transient(),
            Self::Identity(IdentityCacheError::Federation(e)) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(error: serde_json::Error) -> Self {
        Self::Encoding(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            HubError::Validation {
                code: "wom.emptyDeedId"
            }
            .code(),
            "wom.emptyDeedId"
        );
        assert_eq!(HubError::AlreadyDisconnected.code(), "wom.alreadyDisconnected");
        assert_eq!(
            HubError::from(KeyVaultError::KeyUnavailable).code(),
            "wom.hubWalletNotFound"
        );
    }

    #[test]
    fn test_only_transport_failures_are_transient() {
        assert!(HubError::from(FederationError::Unavailable("down".into())).is_transient());
        assert!(!HubError::from(FederationError::Rejected {
            code: "wom.invalid".into(),
            status: 400
        })
        .is_transient());
        assert!(!HubError::NotConnected.is_transient());
        assert!(!HubError::from(KeyVaultError::DecryptionFailed("x".into())).is_transient());
    }
}
