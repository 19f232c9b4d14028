//! # Domain Module
//!
//! Errors, request validation and report status rules of the orchestrator.

pub mod entities;
pub mod errors;
pub mod validation;

pub use entities::*;
pub use errors::*;
pub use validation::*;
