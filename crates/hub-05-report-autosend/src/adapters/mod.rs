//! Observer adapters.

pub mod log;

pub use log::LogObserver;
