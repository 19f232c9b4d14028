//! # Shared Types Crate
//!
//! Domain entities used by every hub subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the membership snapshot and report models are
//!   defined once here and reused by the federation client, the orchestrator
//!   and the auto-send coordinator.
//! - **Wire-Compatible**: entities serialize with the camelCase field set of
//!   the WoM server, omitting absent values and ignoring unknown fields.

pub mod address;
pub mod entities;
pub mod errors;

pub use address::Address;
pub use entities::*;
pub use errors::*;
