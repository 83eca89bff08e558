//! EventTransport port - Interface for opening the server-push stream.
//!
//! The connector owns reconnection and event decoding; a transport only
//! knows how to open one connection and hand back its raw frames.

use async_trait::async_trait;
use futures::stream::Stream;
use secrecy::Secret;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use crate::domain::foundation::TransactionId;
use crate::domain::sync::TransportError;

use super::CommandSink;

/// Raw event payloads (one JSON document per item) of a live connection.
///
/// The stream ending, or yielding an error, means the connection closed.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Parameters of one connection attempt.
#[derive(Clone)]
pub struct StreamRequest {
    /// Access token; travels in the connection URI.
    pub token: Secret<String>,

    /// Restricts the stream to one transaction's events.
    pub transaction_id: Option<TransactionId>,
}

impl fmt::Debug for StreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamRequest")
            .field("token", &"[REDACTED]")
            .field("transaction_id", &self.transaction_id)
            .finish()
    }
}

/// A successfully opened connection.
pub struct OpenedStream {
    pub frames: FrameStream,

    /// Outbound channel for chat commands, if the transport supports one.
    pub commands: Option<Arc<dyn CommandSink>>,
}

impl OpenedStream {
    /// Creates an inbound-only connection.
    pub fn inbound(frames: FrameStream) -> Self {
        Self {
            frames,
            commands: None,
        }
    }

    /// Attaches an outbound command channel.
    pub fn with_commands(mut self, commands: Arc<dyn CommandSink>) -> Self {
        self.commands = Some(commands);
        self
    }
}

/// Port for opening server-push connections.
///
/// # Example
///
/// ```ignore
/// let opened = transport.open(&StreamRequest { token, transaction_id: None }).await?;
/// while let Some(frame) = opened.frames.next().await {
///     let raw = frame?;
///     // decode raw JSON...
/// }
/// ```
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Opens one connection.
    ///
    /// Dropping the returned stream closes the connection.
    async fn open(&self, request: &StreamRequest) -> Result<OpenedStream, TransportError>;
}
