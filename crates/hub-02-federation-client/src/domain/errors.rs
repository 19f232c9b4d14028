//! # Domain Errors
//!
//! Error types for the Federation Client.

use thiserror::Error;

/// Code used when a non-2xx response carries no `wom.*` message key.
pub const ERROR_RESPONSE_CODE: &str = "wom.errorResponse";

/// Code reported when the WoM server cannot be reached.
pub const UNAVAILABLE_CODE: &str = "wom.unavailable";

/// Federation Client error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FederationError {
    /// Transport failure: DNS, connection refused, timeout.
    #[error("WoM server unavailable: {0}")]
    Unavailable(String),

    /// The server answered with a non-success status.
    #[error("WoM server rejected request with status {status}: {code}")]
    Rejected {
        /// `wom.*` message key from the body, or `wom.errorResponse`.
        code: String,
        /// HTTP status code.
        status: u16,
    },

    /// A success response whose body could not be decoded.
    #[error("Invalid WoM response: {0}")]
    InvalidResponse(String),

    /// The request could not be encoded.
    #[error("Request encoding failed: {0}")]
    Encoding(String),
}

impl FederationError {
    /// Stable message key reported to API clients.
    pub fn code(&self) -> &str {
        match self {
            Self::Unavailable(_) => UNAVAILABLE_CODE,
            Self::Rejected { code, .. } => code,
            Self::InvalidResponse(_) | Self::Encoding(_) => ERROR_RESPONSE_CODE,
        }
    }

    /// Only transport failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
