//! # Error Types
//!
//! Parsing errors for shared entities.

use thiserror::Error;

/// Errors raised when parsing an account address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Wrong number of hex characters.
    #[error("Invalid address length: expected 40 hex chars, got {0}")]
    InvalidLength(usize),

    /// Non-hex character in the address.
    #[error("Invalid address encoding: {0}")]
    InvalidHex(String),
}

/// Errors raised when parsing a report status label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown report status: {0}")]
pub struct UnknownStatus(pub String);
