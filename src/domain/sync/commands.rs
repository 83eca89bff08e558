//! Outbound chat commands pushed by the client.

use serde::Serialize;

use crate::domain::foundation::ConversationId;

/// Commands the chat client may push alongside the event stream.
///
/// Fire-and-forget: the resulting state change is observed through the
/// event stream, never through an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatCommand {
    SendMessage {
        conversation_id: ConversationId,
        content: String,
        message_type: MessageType,
    },
    Typing {
        conversation_id: ConversationId,
    },
    MarkRead {
        conversation_id: ConversationId,
    },
}

/// Kind of chat message being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

impl ChatCommand {
    /// Shorthand for a plain text message.
    pub fn text(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        ChatCommand::SendMessage {
            conversation_id,
            content: content.into(),
            message_type: MessageType::Text,
        }
    }

    /// Conversation the command targets.
    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            ChatCommand::SendMessage { conversation_id, .. }
            | ChatCommand::Typing { conversation_id }
            | ChatCommand::MarkRead { conversation_id } => conversation_id,
        }
    }
}
