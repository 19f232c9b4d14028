//! # Ports Module
//!
//! Read/refresh API of the Identity Cache.

pub mod inbound;

pub use inbound::*;
