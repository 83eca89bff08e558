//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Stream base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Endpoint path must start with '/': {0}")]
    InvalidPath(&'static str),

    #[error("Connect timeout must be between 1 and 120 seconds")]
    InvalidTimeout,

    #[error("Max reconnect attempts must be between 1 and 20")]
    InvalidMaxAttempts,

    #[error("Reconnect base delay must be greater than zero")]
    InvalidBaseDelay,

    #[error("Invalid transaction id: {0}")]
    InvalidTransactionId(String),

    #[error("Unknown log format: {0}")]
    InvalidLogFormat(String),
}
