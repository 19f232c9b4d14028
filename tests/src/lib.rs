//! # Meeds Hub Test Suite
//!
//! End-to-end flows across subsystems, with a wiremock server standing in
//! for the WoM federation server.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Node harness, WoM mocks
//!     ├── e2e_federation.rs  # Connect, auto-send, retries, disconnect
//!     └── gateway_flows.rs   # REST API over a live container
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hub-integration-tests
//! cargo test -p hub-integration-tests integration::e2e_federation
//! ```

pub mod integration;
