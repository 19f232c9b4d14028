//! # HUB Gateway
//!
//! Local REST surface over the federation orchestrator.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! Every route under `/api/hub` requires `Authorization: Bearer <admin token>`
//! and answers 401 without it. `/health` is public.
//!
//! ## Error Mapping
//!
//! | Failure | Status | Body |
//! |---------|--------|------|
//! | Request validation | 400 | field message key |
//! | No identity, unknown report | 404 | message key or empty |
//! | WoM server, hub wallet, `AlreadyDisconnected` | 503 | message key |
//! | Encoding, local collaborator | 500 | message key |
//!
//! ## Module Structure
//!
//! ```text
//! hub-gateway/
//! ├── domain/        # GatewayConfig, GatewayError, ApiError
//! ├── middleware/    # AuthLayer (bearer token)
//! ├── routes.rs      # Handlers
//! └── service.rs     # GatewayService (router, server loop)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod middleware;
pub mod routes;
pub mod service;

// Re-exports
pub use domain::{ApiError, GatewayConfig, GatewayError, DEFAULT_BIND_ADDR};
pub use middleware::AuthLayer;
pub use routes::AppState;
pub use service::GatewayService;

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
