//! Port implementations provided by the runtime.

pub mod instrumented;

pub use instrumented::InstrumentedFederationClient;
