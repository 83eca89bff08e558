//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ESCROW_SYNC` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use escrow_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Streaming from {}", config.stream.sse_config().stream_url());
//! ```

mod credentials;
mod error;
mod logging;
mod reconnect;
mod stream;

pub use credentials::CredentialsConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use reconnect::ReconnectConfig;
pub use stream::StreamConfig;

use serde::Deserialize;

/// Root configuration of the sync client
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Event stream endpoint
    pub stream: StreamConfig,

    /// Backoff schedule
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Access token source
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ESCROW_SYNC` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ESCROW_SYNC__STREAM__BASE_URL=https://...` -> `stream.base_url`
    /// - `ESCROW_SYNC__RECONNECT__MAX_ATTEMPTS=5` -> `reconnect.max_attempts`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ESCROW_SYNC")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.stream.validate()?;
        self.reconnect.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
