//! CommandSink port - Outbound chat commands on a live connection.

use async_trait::async_trait;

use crate::domain::sync::{ChatCommand, TransportError};

/// Port for pushing chat commands to the server.
///
/// Commands are fire-and-forget; success only means the command was
/// handed to the server.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send(&self, command: &ChatCommand) -> Result<(), TransportError>;
}
