//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the sync client to external systems:
//! - `sse` - Server-Sent Events transport and command endpoint
//! - `credentials` - Access token lookup (memory, JSON file)
//! - `cache` - In-memory entity cache

pub mod cache;
pub mod credentials;
pub mod sse;

pub use cache::InMemoryEntityCache;
pub use credentials::{FileCredentialStore, StaticCredentials};
pub use sse::{HttpCommandSink, SseConfig, SseDecoder, SseTransport};
