//! # Orchestrator Services
//!
//! - [`HubService`]: membership and signed submissions against the WoM server
//! - [`HubReportService`]: period reports on top of [`HubService`]

mod hub;
mod reports;

pub use hub::{HubDependencies, HubService};
pub use reports::{HubReportService, ReportDependencies, ReportPolicy};
