//! # Domain Module
//!
//! Errors and snapshot transitions of the Identity Cache.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
