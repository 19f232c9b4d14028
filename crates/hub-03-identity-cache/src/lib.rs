//! # HUB-03 Identity Cache
//!
//! In-memory snapshot of the hub's federation membership.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The snapshot answers "is this hub connected, with which deed, since when"
//! without I/O. `refresh()` fetches the hub from the WoM server by its own
//! address and swaps the snapshot atomically:
//!
//! | Remote result | Snapshot |
//! |---------------|----------|
//! | hub found | replaced |
//! | 404 | cleared |
//! | transport/remote error | kept, error returned |
//! | no hub wallet yet | cleared, no request made |
//!
//! Connection state changes are broadcast as `HubStatusBroadcast`.
//!
//! ## Module Structure
//!
//! ```text
//! hub-03-identity-cache/
//! ├── domain/          # ConnectionChange, IdentityCacheError
//! ├── ports/           # IdentityCacheApi, MockIdentityCache
//! └── service.rs       # IdentityCache
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{ConnectionChange, IdentityCacheError};
pub use ports::{IdentityCacheApi, MockIdentityCache};
pub use service::IdentityCache;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
