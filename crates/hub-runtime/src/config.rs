//! # Hub Configuration
//!
//! Loaded from an optional TOML file named by `HUB_CONFIG`, then overridden by
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `HUB_WOM_URL` | `wom.base_url` |
//! | `HUB_WALLET_PATH` | `vault.wallet_path` |
//! | `HUB_PLATFORM_SECRET` | `vault.platform_secret` |
//! | `HUB_ADMIN_PRIVATE_KEY` | `vault.admin_private_key` |
//! | `HUB_GATEWAY_ADDR` | `gateway.bind_addr` |
//! | `HUB_ADMIN_TOKEN` | `gateway.admin_token` |
//!
//! Durations are written as `"30s"`, `"500ms"` or `"2m"`.
//!
//! ## Security Requirements
//!
//! - `vault.platform_secret` MUST be set; it encrypts the hub wallet at rest
//! - `gateway.admin_token` MUST be set while the gateway is enabled

use hub_01_key_vault::KeyVaultConfig;
use hub_02_federation_client::{FederationClientConfig, DEFAULT_WOM_URL};
use hub_05_report_autosend::{AutoSendConfig, MAX_SEND_ATTEMPTS};
use hub_gateway::{GatewayConfig, GatewayError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "HUB_CONFIG";

/// Complete hub configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// WoM server connection.
    pub wom: WomConfig,
    /// Hub wallet storage.
    pub vault: VaultConfig,
    /// Local REST API.
    pub gateway: GatewayConfig,
    /// Automatic report submission.
    pub autosend: AutoSendSettings,
    /// Report bookkeeping.
    pub reports: ReportSettings,
    /// Hub card published on connect.
    pub card: CardSettings,
}

/// WoM server connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WomConfig {
    /// Base URL of the WoM server.
    pub base_url: String,
    /// Whole-request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// TCP connect timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for WomConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WOM_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WomConfig {
    /// Settings of the HTTP federation client.
    pub fn client_config(&self) -> FederationClientConfig {
        FederationClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

/// Hub wallet storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Encrypted wallet file.
    pub wallet_path: PathBuf,
    /// Platform secret the wallet encryption key is derived from.
    pub platform_secret: String,
    /// Hex private key of the platform admin wallet, blank for none.
    pub admin_private_key: String,
    /// Upper bound on a single signature.
    #[serde(with = "humantime_serde")]
    pub sign_timeout: Duration,
    /// Reuse the admin wallet key when the hub wallet is first created.
    pub allow_admin_bootstrap: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        let vault = KeyVaultConfig::default();
        Self {
            wallet_path: PathBuf::from("./data/hub-wallet.json"),
            platform_secret: String::new(),
            admin_private_key: String::new(),
            sign_timeout: vault.sign_timeout,
            allow_admin_bootstrap: vault.allow_admin_bootstrap,
        }
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("wallet_path", &self.wallet_path)
            .field("platform_secret", &"<redacted>")
            .field("admin_private_key", &"<redacted>")
            .field("sign_timeout", &self.sign_timeout)
            .field("allow_admin_bootstrap", &self.allow_admin_bootstrap)
            .finish()
    }
}

impl VaultConfig {
    /// Settings of the key vault service.
    pub fn key_vault_config(&self) -> KeyVaultConfig {
        KeyVaultConfig {
            sign_timeout: self.sign_timeout,
            allow_admin_bootstrap: self.allow_admin_bootstrap,
        }
    }
}

/// Automatic report submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSendSettings {
    /// Submit reports on bus triggers.
    pub enabled: bool,
    /// Attempts per trigger.
    pub max_attempts: u32,
}

impl Default for AutoSendSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: MAX_SEND_ATTEMPTS,
        }
    }
}

impl AutoSendSettings {
    /// Settings of the coordinator.
    pub fn autosend_config(&self) -> AutoSendConfig {
        AutoSendConfig {
            max_attempts: self.max_attempts,
            ..AutoSendConfig::default()
        }
    }
}

/// Report bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Local report index file.
    pub store_path: PathBuf,
    /// Accept periods ending before the join date. Test networks only.
    pub send_outdated: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("./data/hub-reports.json"),
            send_outdated: false,
        }
    }
}

/// Hub card published on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSettings {
    /// Display name.
    pub name: String,
    /// Public description.
    pub description: String,
    /// Public URL of the hub.
    pub url: Option<String>,
    /// Primary theme color.
    pub color: Option<String>,
    /// Logo image uploaded as avatar.
    pub avatar_path: Option<PathBuf>,
    /// Banner image.
    pub banner_path: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`HubConfig`].
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Parse failure.
        reason: String,
    },

    /// The wallet cannot be encrypted without a platform secret.
    #[error(
        "SECURITY VIOLATION: vault.platform_secret is empty. \
         Set HUB_PLATFORM_SECRET environment variable or provide in config."
    )]
    MissingPlatformSecret,

    /// A field holds an unusable value.
    #[error("Invalid configuration field {field}: {reason}")]
    InvalidField {
        /// Dotted field path.
        field: &'static str,
        /// Why it is rejected.
        reason: &'static str,
    },

    /// Gateway settings rejected.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl HubConfig {
    /// Load from `HUB_CONFIG` and the environment, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`HubConfig::load`] over an arbitrary variable lookup.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Missing sections and fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from environment variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(url) = lookup("HUB_WOM_URL") {
            self.wom.base_url = url;
        }
        if let Some(path) = lookup("HUB_WALLET_PATH") {
            self.vault.wallet_path = PathBuf::from(path);
        }
        if let Some(secret) = lookup("HUB_PLATFORM_SECRET") {
            self.vault.platform_secret = secret;
        }
        if let Some(key) = lookup("HUB_ADMIN_PRIVATE_KEY") {
            self.vault.admin_private_key = key;
        }
        if let Some(addr) = lookup("HUB_GATEWAY_ADDR") {
            self.gateway.bind_addr = addr.trim().parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidEnv {
                    var: "HUB_GATEWAY_ADDR",
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(token) = lookup("HUB_ADMIN_TOKEN") {
            self.gateway.admin_token = token;
        }
        Ok(())
    }

    /// Validate configuration before wiring anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.wom.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidField {
                field: "wom.base_url",
                reason: "must be an http(s) URL",
            });
        }
        if self.wom.request_timeout.is_zero() || self.wom.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "wom.request_timeout",
                reason: "timeouts cannot be 0",
            });
        }
        if self.vault.platform_secret.trim().is_empty() {
            return Err(ConfigError::MissingPlatformSecret);
        }
        if self.vault.sign_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "vault.sign_timeout",
                reason: "cannot be 0",
            });
        }
        if self.autosend.max_attempts == 0 {
            return Err(ConfigError::InvalidField {
                field: "autosend.max_attempts",
                reason: "at least one attempt is required",
            });
        }
        self.gateway.validate()?;
        Ok(())
    }
}

/// `Duration` as `"30s"`, `"500ms"` or `"2m"`.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
