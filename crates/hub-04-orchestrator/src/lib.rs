//! # HUB-04 Federation Orchestrator
//!
//! Use cases that change or report the hub's federation membership.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - **Membership**: connect and disconnect with a deed manager's signed
//!   proof, countersigned by the hub wallet. Every attempt refreshes the
//!   identity cache, and success is announced on the event bus.
//! - **Reports**: build a period payload from the computed reward, sign and
//!   submit it, and record the outcome in the local report index.
//! - **Hub card**: push the avatar and banner images with a signed token.
//!
//! Requests are validated before any wallet or network access.
//!
//! ## Report Status
//!
//! ```text
//! stored label         connected  valid date   status
//! ───────────────────  ─────────  ──────────   ─────────────
//! (blank)              no         -            NONE
//! (blank)              yes        yes          NONE
//! (blank)              yes        no           INVALID
//! SENT/PENDING_REWARD/
//!   REWARDED/REJECTED  -          -            same
//! anything else        -          -            ERROR_SENDING (label = error key)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! hub-04-orchestrator/
//! ├── domain/
//! │   ├── entities.rs    # HubCard, ReportRecord, status rules
//! │   ├── errors.rs      # HubError
//! │   └── validation.rs  # Request field checks
//! ├── ports/
//! │   ├── inbound.rs     # HubApi, HubReportApi
//! │   └── outbound.rs    # DeedOracle, RewardReportProvider, UserDirectory,
//! │                      # HubCardProvider, ReportStore
//! ├── adapters/          # In-memory collaborators, FileReportStore
//! └── service/           # HubService, HubReportService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    FileReportStore, InMemoryDeedOracle, InMemoryReportStore, InMemoryRewardReports,
    StaticHubCard, StaticUserDirectory,
};
pub use domain::{HubCard, HubError, ReportRecord};
pub use ports::{
    DeedOracle, HubApi, HubCardProvider, HubReportApi, MockHubReportApi, ReportStore,
    RewardReportProvider, UserDirectory,
};
pub use service::{
    HubDependencies, HubReportService, HubService, ReportDependencies, ReportPolicy,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
