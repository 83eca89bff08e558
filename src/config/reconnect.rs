//! Reconnect backoff configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::sync::ReconnectPolicy;

use super::error::ValidationError;

/// Reconnect backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Retries before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for each further one
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
}

impl ReconnectConfig {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    /// Validate reconnect configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 || self.max_attempts > 20 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        if self.base_delay_ms == 0 {
            return Err(ValidationError::InvalidBaseDelay);
        }
        Ok(())
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> u64 {
    1000
}
