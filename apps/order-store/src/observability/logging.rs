//! Log subscriber setup.
//!
//! `RUST_LOG`, when set, takes precedence over the configured level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the level cannot be parsed or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        "pretty" => registry.with(fmt::layer().pretty()).try_init(),
        _ => registry.with(fmt::layer().compact()).try_init(),
    };

    result.map_err(|e| LoggingError::SubscriberError(e.to_string()))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })
}
