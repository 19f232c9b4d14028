//! # Ports Module
//!
//! The federation API consumed by the orchestrator.

pub mod inbound;

pub use inbound::*;
