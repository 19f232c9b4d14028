//! Meeds Hub federation node.
//!
//! Configuration is read from `HUB_CONFIG` (TOML) and `HUB_*` environment
//! variables; logging from `HUB_LOG_LEVEL`/`RUST_LOG` and `HUB_LOG_JSON`.

use anyhow::{Context, Result};
use hub_runtime::{HubConfig, HubRuntime};
use hub_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = HubConfig::load().context("Failed to load configuration")?;

    let mut runtime = HubRuntime::new(config)?;
    runtime.start().await?;

    info!("Hub is running. Press Ctrl+C to stop.");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
        }
        _ = runtime.stopped() => {}
    }

    runtime.shutdown().await;
    Ok(())
}
