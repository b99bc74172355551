//! Configuration loading and typed config structures for the API server.
//!
//! The configuration lives in a YAML file (`crowdwatch.yaml` by default).
//! Every field has a default, so an empty or missing file yields a working
//! configuration. A few listener settings can be overridden from the
//! environment for container deployments.

use std::path::Path;

use crowdwatch_api::{ServerConfig, StoreConfig};
use serde::Deserialize;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "crowdwatch.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range, or an override is malformed.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring the YAML structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Store capacity limits.
    #[serde(default)]
    pub store: StoreSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `CROWDWATCH_HOST` overrides `server.host`
    /// - `CROWDWATCH_PORT` overrides `server.port`
    /// - `CROWDWATCH_MAX_CONNECTIONS` overrides `server.max_connections`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.server.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with env overrides applied, for when no file exists.
    pub fn from_env_defaults() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.server.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.backlog == 0 {
            return Err(ConfigError::Invalid(String::from(
                "server.backlog must be at least 1",
            )));
        }
        if self.store.metric_capacity == 0 || self.store.recommendation_capacity == 0 {
            return Err(ConfigError::Invalid(String::from(
                "store capacities must be at least 1",
            )));
        }
        Ok(())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address: an IP literal or `localhost`.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen backlog.
    #[serde(default = "default_backlog")]
    pub backlog: u32,

    /// Maximum concurrently handled connections (0 = unlimited).
    #[serde(default)]
    pub max_connections: usize,
}

impl ServerSection {
    /// Override listener values with environment variables when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CROWDWATCH_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("CROWDWATCH_PORT") {
            self.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid CROWDWATCH_PORT: {e}")))?;
        }
        if let Ok(val) = std::env::var("CROWDWATCH_MAX_CONNECTIONS") {
            self.max_connections = val.parse().map_err(|e| {
                ConfigError::Invalid(format!("invalid CROWDWATCH_MAX_CONNECTIONS: {e}"))
            })?;
        }
        Ok(())
    }

    /// Convert into the API crate's listener configuration.
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            backlog: self.backlog,
            max_connections: self.max_connections,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backlog: default_backlog(),
            max_connections: 0,
        }
    }
}

/// Store capacity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// Maximum number of zone metric samples.
    #[serde(default = "default_metric_capacity")]
    pub metric_capacity: usize,

    /// Maximum number of recommendations.
    #[serde(default = "default_recommendation_capacity")]
    pub recommendation_capacity: usize,
}

impl StoreSection {
    /// Convert into the API crate's store configuration.
    pub const fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            metric_capacity: self.metric_capacity,
            recommendation_capacity: self.recommendation_capacity,
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            metric_capacity: default_metric_capacity(),
            recommendation_capacity: default_recommendation_capacity(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_backlog() -> u32 {
    128
}

const fn default_metric_capacity() -> usize {
    crowdwatch_api::store::DEFAULT_METRIC_CAPACITY
}

const fn default_recommendation_capacity() -> usize {
    crowdwatch_api::store::DEFAULT_RECOMMENDATION_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}
