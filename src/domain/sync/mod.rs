//! Sync module - events, connection state and backoff for the push stream.

mod commands;
mod connection;
mod errors;
mod event;
mod reconnect;

pub use commands::{ChatCommand, MessageType};
pub use connection::{ConnectionState, ConnectionStatus};
pub use errors::{SyncError, TransportError, CONNECTION_CLOSED};
pub use event::{
    ConversationActivity, DomainEvent, EventKind, MessageReceived, StatusChanged, Subject,
    TransactionChange,
};
pub use reconnect::ReconnectPolicy;
