//! Prometheus metrics for the hub federation node.
//!
//! All metrics follow the naming convention: `hub_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

/// Outcome label of a successful federation request.
pub const OUTCOME_OK: &str = "ok";

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // FEDERATION CLIENT METRICS (Subsystem 2)
    // =========================================================================

    /// Calls to the WoM server by operation and outcome
    pub static ref FEDERATION_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("hub_federation_requests_total", "Requests sent to the WoM server"),
        &["operation", "outcome"]  // outcome: ok or the error code
    ).expect("metric creation failed");

    /// Latency of calls to the WoM server
    pub static ref FEDERATION_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "hub_federation_request_duration_seconds",
            "Time spent waiting for the WoM server"
        ).buckets(exponential_buckets(0.005, 2.0, 12).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // REPORT METRICS (Subsystem 5)
    // =========================================================================

    /// Report submission attempts, retries included
    pub static ref REPORT_SEND_ATTEMPTS: Counter = Counter::new(
        "hub_report_send_attempts_total",
        "Report submission attempts"
    ).expect("metric creation failed");

    /// Reports accepted by the WoM server
    pub static ref REPORTS_SENT: Counter = Counter::new(
        "hub_reports_sent_total",
        "Reports accepted by the WoM server"
    ).expect("metric creation failed");

    /// Reports abandoned after the last attempt
    pub static ref REPORT_SEND_FAILURES: CounterVec = CounterVec::new(
        Opts::new("hub_report_send_failures_total", "Reports that could not be sent"),
        &["kind"]
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
#[derive(Debug)]
pub struct MetricsHandle {
    _private: (),
}

/// Register all metrics with the global registry.
///
/// Registering twice is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Federation
        Box::new(FEDERATION_REQUESTS.clone()),
        Box::new(FEDERATION_REQUEST_DURATION.clone()),
        // Reports
        Box::new(REPORT_SEND_ATTEMPTS.clone()),
        Box::new(REPORTS_SENT.clone()),
        Box::new(REPORT_SEND_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _private: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_encode_contains_counters() {
        register_metrics().unwrap();
        FEDERATION_REQUESTS
            .with_label_values(&["submit_report", OUTCOME_OK])
            .inc();
        REPORT_SEND_ATTEMPTS.inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("hub_federation_requests_total"));
        assert!(text.contains("operation=\"submit_report\""));
        assert!(text.contains("hub_report_send_attempts_total"));
    }
}
