//! Outbound commands for an SSE session.
//!
//! Server-Sent Events are one-way, so chat commands are POSTed as JSON to
//! a companion endpoint authenticated with the same token as the stream.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::domain::sync::{ChatCommand, TransportError};
use crate::ports::CommandSink;

use super::transport::{check_status, map_send_error};

pub struct HttpCommandSink {
    client: Client,
    url: String,
    token: Secret<String>,
}

impl HttpCommandSink {
    pub fn new(client: Client, url: impl Into<String>, token: Secret<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token,
        }
    }
}

#[async_trait]
impl CommandSink for HttpCommandSink {
    async fn send(&self, command: &ChatCommand) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("token", self.token.expose_secret())])
            .json(command)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response).await?;

        tracing::debug!(conversation_id = %command.conversation_id(), "Command delivered");
        Ok(())
    }
}
