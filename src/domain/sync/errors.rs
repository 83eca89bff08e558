//! Error taxonomy for the event synchronization client.

use thiserror::Error;

/// Text surfaced as `last_error` while a reconnect is pending.
pub const CONNECTION_CLOSED: &str = "Connection closed";

/// Failures of the push transport itself.
///
/// Every variant is transient from the connector's point of view and is
/// retried on the backoff schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Stream rejected the access token")]
    Unauthorized,

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream error: {0}")]
    Stream(String),
}

impl TransportError {
    /// Creates a connect error.
    pub fn connect(message: impl Into<String>) -> Self {
        TransportError::Connect(message.into())
    }

    /// Creates a stream error.
    pub fn stream(message: impl Into<String>) -> Self {
        TransportError::Stream(message.into())
    }
}

/// Errors surfaced by the connector to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No access token could be resolved; fatal for one `connect()` call.
    #[error("No authentication token found")]
    NoCredentials,

    /// A connection drop or failed open; retried with backoff.
    #[error("Connection closed: {0}")]
    Transport(#[from] TransportError),

    /// Terminal until an explicit `connect()`.
    #[error("Max reconnection attempts reached. Please refresh the page.")]
    MaxRetriesExceeded,

    /// A pushed payload that is not a valid event; never escalated.
    #[error("Malformed event: {0}")]
    MalformedMessage(String),

    /// An outbound command was issued without a live connection.
    #[error("Not connected")]
    NotConnected,

    /// The attempt was superseded by `disconnect()` or a newer `connect()`.
    #[error("Connection attempt cancelled")]
    Cancelled,
}

impl SyncError {
    /// Creates a malformed message error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        SyncError::MalformedMessage(reason.into())
    }
}
