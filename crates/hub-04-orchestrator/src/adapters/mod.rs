//! Adapters for the orchestrator's outbound ports.

pub mod platform;
pub mod report_store;

pub use platform::{InMemoryDeedOracle, InMemoryRewardReports, StaticHubCard, StaticUserDirectory};
pub use report_store::{FileReportStore, InMemoryReportStore};
