//! # Domain Module
//!
//! Core domain types for the Key Vault.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
