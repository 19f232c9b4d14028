//! # Ports Module
//!
//! Inbound API and outbound dependencies of the Key Vault.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
