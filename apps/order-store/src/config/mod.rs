//! Configuration module for the order store.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the persistence and logging settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_store::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("database: {}", config.persistence.database_url);
//! ```

mod observability;
mod persistence;

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LoggingConfig, ObservabilityConfig};
pub use persistence::PersistenceConfig;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Persistence configuration.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Like [`load_config`], but a missing file yields the built-in defaults.
///
/// # Errors
///
/// Returns a `ConfigError` if an existing file cannot be read, parsed, or
/// validated.
pub fn load_config_or_default(path: Option<&str>) -> Result<Config, ConfigError> {
    match load_config(path) {
        Err(ConfigError::ReadError { source, .. }) if source.kind() == ErrorKind::NotFound => {
            Ok(Config::default())
        }
        other => other,
    }
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become the empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let persistence = &config.persistence;

    if persistence.database_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "persistence.database_url must not be empty".to_string(),
        ));
    }

    if persistence.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "persistence.max_connections must be positive".to_string(),
        ));
    }

    let format = config.observability.logging.format.as_str();
    if !LoggingConfig::FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {:?}",
            LoggingConfig::FORMATS
        )));
    }

    Ok(())
}
