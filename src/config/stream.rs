//! Event stream endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::SseConfig;
use crate::domain::foundation::TransactionId;

use super::error::ValidationError;

/// Event stream endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Scheme and host of the API
    pub base_url: String,

    /// Path of the SSE endpoint
    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    /// Path accepting chat commands
    #[serde(default = "default_command_path")]
    pub command_path: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Only receive events of this transaction
    pub transaction_id: Option<String>,
}

impl StreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Subject filter, if configured.
    pub fn subject(&self) -> Result<Option<TransactionId>, ValidationError> {
        self.transaction_id
            .as_deref()
            .map(|id| {
                TransactionId::new(id)
                    .map_err(|e| ValidationError::InvalidTransactionId(e.to_string()))
            })
            .transpose()
    }

    /// Transport settings for the SSE adapter.
    pub fn sse_config(&self) -> SseConfig {
        SseConfig {
            base_url: self.base_url.clone(),
            stream_path: self.stream_path.clone(),
            command_path: self.command_path.clone(),
            connect_timeout: self.connect_timeout(),
        }
    }

    /// Validate stream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("STREAM__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if !self.stream_path.starts_with('/') {
            return Err(ValidationError::InvalidPath("stream_path"));
        }
        if !self.command_path.starts_with('/') {
            return Err(ValidationError::InvalidPath("command_path"));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.subject()?;
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            stream_path: default_stream_path(),
            command_path: default_command_path(),
            connect_timeout_secs: default_connect_timeout(),
            transaction_id: None,
        }
    }
}

fn default_stream_path() -> String {
    "/api/events/stream".to_string()
}

fn default_command_path() -> String {
    "/api/events/commands".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}
