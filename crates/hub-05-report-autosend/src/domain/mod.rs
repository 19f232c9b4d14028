//! # Domain Module
//!
//! Send state machine, outcomes and errors of the auto-send coordinator.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
