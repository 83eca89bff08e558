//! Server-Sent Events adapter.
//!
//! - `SseTransport` - `EventTransport` over a `text/event-stream` GET
//! - `HttpCommandSink` - Chat commands POSTed alongside the stream
//! - `SseDecoder` - Incremental `text/event-stream` parser

mod command_sink;
mod decoder;
mod transport;

pub use command_sink::HttpCommandSink;
pub use decoder::SseDecoder;
pub use transport::{SseConfig, SseTransport};
