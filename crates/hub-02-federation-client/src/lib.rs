//! # HUB-02 Federation Client
//!
//! Wire models and HTTP transport for the World of Meeds (WoM) API.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! One local call is one HTTP request/response. The client never retries;
//! it classifies failures so callers can decide:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx | decoded body |
//! | 404 on a lookup | `None` |
//! | other non-2xx | `Rejected { code, status }`, code from the `wom.*` message key |
//! | DNS / refused / timeout | `Unavailable` |
//!
//! ## Module Structure
//!
//! ```text
//! hub-02-federation-client/
//! ├── domain/          # ConnectionRequest, DisconnectionRequest, ReportSubmission, errors
//! ├── ports/           # FederationClient, MockFederationClient
//! └── adapters/        # HttpFederationClient (reqwest)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{FederationClientConfig, HttpFederationClient, DEFAULT_WOM_URL};
pub use domain::{
    report_hash, AssetKind, AssetUpload, ConnectionRequest, DisconnectionRequest,
    FederationError, HubSigned, ReportSubmission, ERROR_RESPONSE_CODE, UNAVAILABLE_CODE,
};
pub use ports::{FederationClient, MockFederationClient};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
