//! Server-Sent Events transport over reqwest.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::sync::TransportError;
use crate::ports::{EventTransport, FrameStream, OpenedStream, StreamRequest};

use super::command_sink::HttpCommandSink;
use super::decoder::SseDecoder;

/// Configuration for the SSE transport.
#[derive(Debug, Clone)]
pub struct SseConfig {
    /// Scheme and host of the API, e.g. `https://api.example.com`.
    pub base_url: String,

    /// Path of the event stream endpoint.
    pub stream_path: String,

    /// Path accepting chat commands for the same session.
    pub command_path: String,

    /// Bound on establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
}

impl SseConfig {
    /// Creates a config with the default endpoint paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stream_path: "/api/events/stream".to_string(),
            command_path: "/api/events/commands".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn stream_url(&self) -> String {
        join_url(&self.base_url, &self.stream_path)
    }

    pub fn command_url(&self) -> String {
        join_url(&self.base_url, &self.command_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Opens one long-lived `text/event-stream` GET per connection.
///
/// Only a connect timeout is set on the client: a total request timeout
/// would cut healthy streams.
pub struct SseTransport {
    config: SseConfig,
    client: Client,
}

impl SseTransport {
    pub fn new(config: SseConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SseConfig {
        &self.config
    }
}

#[async_trait]
impl EventTransport for SseTransport {
    async fn open(&self, request: &StreamRequest) -> Result<OpenedStream, TransportError> {
        let mut query = vec![("token", request.token.expose_secret().clone())];
        if let Some(transaction_id) = &request.transaction_id {
            query.push(("transaction_id", transaction_id.to_string()));
        }

        tracing::debug!(
            url = %self.config.stream_url(),
            transaction_id = ?request.transaction_id,
            "Opening event stream"
        );

        let response = self
            .client
            .get(self.config.stream_url())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .query(&query)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;

        let commands = HttpCommandSink::new(
            self.client.clone(),
            self.config.command_url(),
            request.token.clone(),
        );
        Ok(OpenedStream::inbound(decode_frames(response.bytes_stream()))
            .with_commands(Arc::new(commands)))
    }
}

pub(super) fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::connect(format!("Timed out: {}", e))
    } else {
        TransportError::connect(e.to_string())
    }
}

pub(super) async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => Err(TransportError::Unauthorized),
        code => Err(TransportError::Status { status: code, body }),
    }
}

/// Turns a byte stream into a stream of event payloads.
///
/// The first transport error (or an overlong line) is yielded and then the
/// stream ends.
pub(crate) fn decode_frames<S, B, E>(bytes: S) -> FrameStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = (Some(Box::pin(bytes)), SseDecoder::new(), VecDeque::new());

    Box::pin(stream::unfold(
        state,
        |(mut bytes, mut decoder, mut pending)| async move {
            loop {
                if let Some(frame) = pending.pop_front() {
                    return Some((Ok(frame), (bytes, decoder, pending)));
                }
                let source = bytes.as_mut()?;
                match source.next().await {
                    Some(Ok(chunk)) => match decoder.push(chunk.as_ref()) {
                        Ok(frames) => pending.extend(frames),
                        Err(error) => return Some((Err(error), (None, decoder, pending))),
                    },
                    Some(Err(e)) => {
                        let error = TransportError::stream(e.to_string());
                        return Some((Err(error), (None, decoder, pending)));
                    }
                    None => return None,
                }
            }
        },
    ))
}
