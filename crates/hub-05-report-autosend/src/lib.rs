//! # HUB-05 Report Auto-Send Coordinator
//!
//! Submits period reports without an operator.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Triggers
//!
//! | Bus event | Reported period |
//! |-----------|-----------------|
//! | `HubConnected` | the one containing `join_date - 7 days`, only if the hub joined less than an hour ago |
//! | `RewardReportCompleted { period_id }` | `period_id` |
//!
//! A period is sent only when its reward computation is complete and no hash
//! is recorded for it yet. Each trigger makes at most three sequential
//! attempts, without backoff; only transient failures are retried. Progress
//! is published as `ReportSending`, `ReportSent` and `ReportSendFailed`.
//!
//! ## Module Structure
//!
//! ```text
//! hub-05-report-autosend/
//! ├── domain/          # SendState, SendOutcome, AutoSendConfig
//! ├── ports/           # AutoSendApi, SendObserver, RecordingObserver
//! ├── adapters/        # LogObserver
//! └── service.rs       # ReportAutoSender
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::LogObserver;
pub use domain::{
    AutoSendConfig, AutoSendError, SendOutcome, SendState, SkipReason, Trigger, MAX_SEND_ATTEMPTS,
};
pub use ports::{AutoSendApi, Observed, RecordingObserver, SendObserver};
pub use service::ReportAutoSender;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
