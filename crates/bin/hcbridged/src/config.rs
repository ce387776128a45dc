//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hcbridge.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::str::FromStr;
use std::time::Duration;

use hcbridge_adapter_hub_http::HubConfig;
use hcbridge_app::settings::{BridgeSettings, DEFAULT_POLL_INTERVAL};
use hcbridge_domain::error::ValidationError;
use hcbridge_domain::temperature::TemperatureUnit;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Poll intervals above this many seconds are rejected in favour of the
/// default.
const MAX_POLL_INTERVAL_SECS: u64 = 100;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hub connection.
    pub hub: HubSection,
    /// Engine behaviour.
    pub bridge: BridgeSection,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Hub connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubSection {
    /// Root URL of the hub (e.g. `http://192.168.1.10`).
    pub url: String,
    pub username: String,
    #[serde(deserialize_with = "secret")]
    pub password: SecretString,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

/// Engine settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    /// Seconds between polls; `0` disables polling.
    pub poll_interval_secs: u64,
    /// How long a manual setpoint holds; `0` means forever.
    pub thermostat_timeout_secs: u64,
    pub cooling_management: bool,
    /// Comma-separated global variable names exposed as switches.
    pub switch_global_variables: String,
    pub security_system: bool,
    /// `C` or `F`.
    pub temperature_unit: String,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl Config {
    /// Load configuration from `hcbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("hcbridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HCBRIDGE_HUB_URL") {
            self.hub.url = val;
        }
        if let Some(val) = var("HCBRIDGE_HUB_USERNAME") {
            self.hub.username = val;
        }
        if let Some(val) = var("HCBRIDGE_HUB_PASSWORD") {
            self.hub.password = SecretString::from(val);
        }
        if let Some(val) = var("HCBRIDGE_POLL_INTERVAL") {
            match val.parse() {
                Ok(secs) => self.bridge.poll_interval_secs = secs,
                Err(_) => tracing::warn!(value = %val, "ignoring non-numeric HCBRIDGE_POLL_INTERVAL"),
            }
        }
        if let Some(val) = var("HCBRIDGE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("HCBRIDGE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("HCBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.url.trim().is_empty() {
            return Err(ConfigError::Validation("hub url must be set".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.temperature_unit()?;
        Ok(())
    }

    /// Parsed hub connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Url`] if the hub URL does not parse.
    pub fn hub_config(&self) -> Result<HubConfig, ConfigError> {
        let url = Url::parse(self.hub.url.trim())?;
        Ok(
            HubConfig::new(url, self.hub.username.clone(), self.hub.password.clone())
                .with_timeout(Duration::from_secs(self.hub.timeout_secs)),
        )
    }

    /// Engine settings after normalization.
    #[must_use]
    pub fn bridge_settings(&self) -> BridgeSettings {
        let bridge = &self.bridge;
        BridgeSettings {
            poll_interval: self.poll_interval(),
            thermostat_timeout: Duration::from_secs(bridge.thermostat_timeout_secs),
            cooling_management: bridge.cooling_management,
            switch_global_variables: split_names(&bridge.switch_global_variables),
            security_system: bridge.security_system,
            temperature_unit: self.temperature_unit().unwrap_or_default(),
            ..BridgeSettings::default()
        }
    }

    fn poll_interval(&self) -> Duration {
        let secs = self.bridge.poll_interval_secs;
        if secs > MAX_POLL_INTERVAL_SECS {
            tracing::warn!(
                configured = secs,
                fallback = DEFAULT_POLL_INTERVAL.as_secs(),
                "poll interval too large, using default"
            );
            DEFAULT_POLL_INTERVAL
        } else {
            Duration::from_secs(secs)
        }
    }

    fn temperature_unit(&self) -> Result<TemperatureUnit, ConfigError> {
        Ok(TemperatureUnit::from_str(self.bridge.temperature_unit.trim())?)
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: SecretString::from(String::new()),
            timeout_secs: HubConfig::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for BridgeSection {
    fn default() -> Self {
        let defaults = BridgeSettings::default();
        Self {
            poll_interval_secs: defaults.poll_interval.as_secs(),
            thermostat_timeout_secs: defaults.thermostat_timeout.as_secs(),
            cooling_management: false,
            switch_global_variables: String::new(),
            security_system: false,
            temperature_unit: "C".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8581,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:hcbridge.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hcbridged=info,hcbridge=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// The hub URL does not parse.
    #[error("invalid hub url")]
    Url(#[from] url::ParseError),
    /// A value the domain rejects, such as an unknown temperature unit.
    #[error("invalid configuration value")]
    Value(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
