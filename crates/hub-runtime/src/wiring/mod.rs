//! # Subsystem Wiring
//!
//! Each subsystem defines its **ports** (traits). The runtime connects them:
//! bus events reach their handlers through [`EventRouter`].

pub mod event_routing;
pub mod handlers;

pub use event_routing::EventRouter;
pub use handlers::{AutoSendHandler, CardSyncHandler, EventHandler, ReportMetricsHandler};
