//! Gateway configuration.

use super::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::LOCALHOST),
    8085,
);

/// REST server settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Serve the REST API.
    pub enabled: bool,
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Bearer token required on every `/api/hub` request.
    pub admin_token: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: DEFAULT_BIND_ADDR,
            admin_token: String::new(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("bind_addr", &self.bind_addr)
            .field("admin_token", &"<redacted>")
            .finish()
    }
}

impl GatewayConfig {
    /// Check the settings before binding.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.enabled && self.admin_token.trim().is_empty() {
            return Err(GatewayError::Config(
                "gateway.admin_token must be set when the gateway is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_gateway_requires_token() {
        let config = GatewayConfig::default();
        assert!(matches!(config.validate(), Err(GatewayError::Config(_))));

        let config = GatewayConfig {
            admin_token: "s3cret".into(),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_ok());

        let disabled = GatewayConfig {
            enabled: false,
            ..GatewayConfig::default()
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GatewayConfig {
            admin_token: "s3cret".into(),
            ..GatewayConfig::default()
        };
        assert!(!format!("{config:?}").contains("s3cret"));
    }
}
