//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it
    #[serde(default = "default_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_format")]
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            _ => Err(ValidationError::InvalidLogFormat(self.format.clone())),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info,escrow_sync=debug".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
