//! # Adapters Layer (Hexagonal Architecture)
//!
//! HTTP implementation of the federation API.

mod http;

pub use http::{FederationClientConfig, HttpFederationClient, DEFAULT_WOM_URL};
