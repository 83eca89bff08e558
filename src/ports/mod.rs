//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the sync client and the outside world. Adapters implement these ports.
//!
//! ## Transport Ports
//!
//! - `EventTransport` - Opens the server-push connection
//! - `CommandSink` - Pushes chat commands on a live connection
//!
//! ## Consumer Ports
//!
//! - `CredentialProvider` - Resolves the access token
//! - `EntityCache` - Keyed cache the reconciler writes to

mod command_sink;
mod credential_provider;
mod entity_cache;
mod event_transport;

pub use command_sink::CommandSink;
pub use credential_provider::CredentialProvider;
pub use entity_cache::EntityCache;
pub use event_transport::{EventTransport, FrameStream, OpenedStream, StreamRequest};
