//! # Hub Telemetry
//!
//! Structured logging and Prometheus metrics for the hub node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hub_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _metrics = init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HUB_SERVICE_NAME` | `meeds-hub` | Service name in the startup record |
//! | `HUB_LOG_LEVEL` | `info` | Log level filter, `RUST_LOG` as fallback |
//! | `HUB_LOG_JSON` | `false` | JSON output, on by default in containers |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
mod metrics;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::{env_filter, init_tracing};
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, FEDERATION_REQUESTS,
    FEDERATION_REQUEST_DURATION, OUTCOME_OK, REGISTRY, REPORTS_SENT, REPORT_SEND_ATTEMPTS,
    REPORT_SEND_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    /// Registry or encoder failure.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Unparsable filter directives.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the log subscriber.
///
/// The returned handle should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<MetricsHandle, TelemetryError> {
    let handle = register_metrics()?;
    init_tracing(config)?;
    Ok(handle)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
