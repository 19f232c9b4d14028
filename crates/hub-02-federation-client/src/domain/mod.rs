//! # Domain Module
//!
//! Wire requests and errors of the Federation Client.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
