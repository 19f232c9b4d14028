//! # Ports Module
//!
//! Trigger API of the coordinator and the observer it reports attempts to.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
