//! # Ports Module
//!
//! Use-case APIs of the orchestrator and the local collaborators it needs.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
