//! Gateway domain: configuration and error mapping.

pub mod config;
pub mod error;

pub use config::{GatewayConfig, DEFAULT_BIND_ADDR};
pub use error::{ApiError, GatewayError, EMPTY_CONNECTION_REQUEST, EMPTY_DISCONNECTION_REQUEST};
