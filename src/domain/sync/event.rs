//! Domain events pushed by the server.
//!
//! The wire carries loosely-typed JSON objects:
//!
//! ```text
//! {"type":"status_changed","transactionId":"T1","status":"delivered",
//!  "previousStatus":"shipped","timestamp":"2024-01-15T10:30:00Z"}
//! ```
//!
//! Decoding turns them into [`DomainEvent`], a sum type over the known
//! kinds. Unknown `type` values decode to [`DomainEvent::Unrecognized`] so
//! newer servers do not break older clients.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::{
    ConversationId, RawId, RawTimestamp, Timestamp, TransactionId,
};

use super::errors::SyncError;

/// Known event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConnectionEstablished,
    MessageReceived,
    StatusChanged,
    EntityUpdated,
    ParticipantAssigned,
    UserTyping,
    ReadMarker,
}

impl EventKind {
    /// Maps a wire `type` value (including legacy aliases) to a kind.
    pub fn from_wire(kind: &str) -> Option<Self> {
        let kind = match kind {
            "connected" | "connection_established" => EventKind::ConnectionEstablished,
            "new_message" | "message" | "message_received" => EventKind::MessageReceived,
            "status_changed" => EventKind::StatusChanged,
            "transaction_updated" | "entity_updated" => EventKind::EntityUpdated,
            "participant_assigned" | "seller_assigned" => EventKind::ParticipantAssigned,
            "typing" | "user_typing" => EventKind::UserTyping,
            "messages_read" | "read" => EventKind::ReadMarker,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical wire name.
    pub fn as_wire(&self) -> &'static str {
        match self {
            EventKind::ConnectionEstablished => "connected",
            EventKind::MessageReceived => "new_message",
            EventKind::StatusChanged => "status_changed",
            EventKind::EntityUpdated => "transaction_updated",
            EventKind::ParticipantAssigned => "participant_assigned",
            EventKind::UserTyping => "typing",
            EventKind::ReadMarker => "messages_read",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// Entity an event concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Transaction(TransactionId),
    Conversation(ConversationId),
}

/// A transaction moved between statuses.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChanged {
    pub transaction_id: Option<TransactionId>,
    pub previous_status: Option<String>,
    pub status: Option<String>,
    pub payload: Option<Value>,
    pub message: Option<String>,
    pub timestamp: Timestamp,
}

/// A transaction changed in a way not described by a status transition.
///
/// Used for both entity updates and participant assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionChange {
    pub transaction_id: Option<TransactionId>,
    pub payload: Option<Value>,
    pub message: Option<String>,
    pub timestamp: Timestamp,
}

/// A chat message arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReceived {
    pub conversation_id: Option<ConversationId>,
    pub transaction_id: Option<TransactionId>,
    /// Full message snapshot, when the server sent one.
    pub snapshot: Option<Value>,
    pub timestamp: Timestamp,
}

/// Ephemeral conversation activity: typing indicators and read markers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationActivity {
    pub conversation_id: Option<ConversationId>,
    pub user_id: Option<String>,
    pub timestamp: Timestamp,
}

/// A decoded server-push event.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    ConnectionEstablished {
        message: Option<String>,
        timestamp: Timestamp,
    },
    MessageReceived(MessageReceived),
    StatusChanged(StatusChanged),
    EntityUpdated(TransactionChange),
    ParticipantAssigned(TransactionChange),
    UserTyping(ConversationActivity),
    ReadMarker(ConversationActivity),
    /// A `type` this client does not know; ignored.
    Unrecognized { kind: String },
}

impl DomainEvent {
    /// Decodes one pushed JSON payload.
    ///
    /// `received_at` becomes the event timestamp when the server did not
    /// provide a usable one, so re-applying the decoded event is stable.
    pub fn decode(raw: &str, received_at: Timestamp) -> Result<Self, SyncError> {
        let wire: WireEvent =
            serde_json::from_str(raw).map_err(|e| SyncError::malformed(e.to_string()))?;
        if wire.kind.trim().is_empty() {
            return Err(SyncError::malformed("event type is empty"));
        }
        Ok(wire.into_event(received_at))
    }

    /// Kind of the event, `None` for unrecognized events.
    pub fn kind(&self) -> Option<EventKind> {
        let kind = match self {
            DomainEvent::ConnectionEstablished { .. } => EventKind::ConnectionEstablished,
            DomainEvent::MessageReceived(_) => EventKind::MessageReceived,
            DomainEvent::StatusChanged(_) => EventKind::StatusChanged,
            DomainEvent::EntityUpdated(_) => EventKind::EntityUpdated,
            DomainEvent::ParticipantAssigned(_) => EventKind::ParticipantAssigned,
            DomainEvent::UserTyping(_) => EventKind::UserTyping,
            DomainEvent::ReadMarker(_) => EventKind::ReadMarker,
            DomainEvent::Unrecognized { .. } => return None,
        };
        Some(kind)
    }

    /// Entity the event concerns, if any.
    pub fn subject(&self) -> Option<Subject> {
        match self {
            DomainEvent::StatusChanged(e) => e.transaction_id.clone().map(Subject::Transaction),
            DomainEvent::EntityUpdated(e) | DomainEvent::ParticipantAssigned(e) => {
                e.transaction_id.clone().map(Subject::Transaction)
            }
            DomainEvent::MessageReceived(e) => {
                e.conversation_id.clone().map(Subject::Conversation)
            }
            DomainEvent::UserTyping(e) | DomainEvent::ReadMarker(e) => {
                e.conversation_id.clone().map(Subject::Conversation)
            }
            DomainEvent::ConnectionEstablished { .. } | DomainEvent::Unrecognized { .. } => None,
        }
    }

    /// True for events routed to the status-change callback.
    pub fn is_status_notification(&self) -> bool {
        matches!(
            self,
            DomainEvent::StatusChanged(_)
                | DomainEvent::EntityUpdated(_)
                | DomainEvent::ParticipantAssigned(_)
        )
    }

    /// Authoritative time of the event.
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            DomainEvent::ConnectionEstablished { timestamp, .. } => Some(*timestamp),
            DomainEvent::MessageReceived(e) => Some(e.timestamp),
            DomainEvent::StatusChanged(e) => Some(e.timestamp),
            DomainEvent::EntityUpdated(e) | DomainEvent::ParticipantAssigned(e) => {
                Some(e.timestamp)
            }
            DomainEvent::UserTyping(e) | DomainEvent::ReadMarker(e) => Some(e.timestamp),
            DomainEvent::Unrecognized { .. } => None,
        }
    }
}

/// Raw JSON shape of a pushed event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, alias = "transaction_id")]
    transaction_id: Option<RawId>,
    #[serde(default, alias = "conversation_id")]
    conversation_id: Option<RawId>,
    #[serde(default, alias = "user_id")]
    user_id: Option<RawId>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "previous_status")]
    previous_status: Option<String>,
    #[serde(default)]
    timestamp: Option<RawTimestamp>,
    #[serde(default)]
    payload: Option<Value>,
    /// Human-readable text; older chat servers put the message object here.
    #[serde(default)]
    message: Option<Value>,
}

impl WireEvent {
    fn into_event(self, received_at: Timestamp) -> DomainEvent {
        let Some(kind) = EventKind::from_wire(&self.kind) else {
            return DomainEvent::Unrecognized { kind: self.kind };
        };
        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(RawTimestamp::parse)
            .unwrap_or(received_at);
        let text = self.message.as_ref().and_then(|m| m.as_str().map(str::to_string));

        match kind {
            EventKind::ConnectionEstablished => DomainEvent::ConnectionEstablished {
                message: text,
                timestamp,
            },
            EventKind::MessageReceived => {
                let snapshot = self
                    .payload
                    .filter(Value::is_object)
                    .or_else(|| self.message.filter(Value::is_object));
                let conversation_id = id_or_field(self.conversation_id, snapshot.as_ref(), "conversation_id")
                    .and_then(|id| ConversationId::new(id).ok());
                let transaction_id = id_or_field(self.transaction_id, snapshot.as_ref(), "transaction_id")
                    .and_then(|id| TransactionId::new(id).ok());
                DomainEvent::MessageReceived(MessageReceived {
                    conversation_id,
                    transaction_id,
                    snapshot,
                    timestamp,
                })
            }
            EventKind::StatusChanged => {
                let transaction_id = transaction_subject(self.transaction_id, self.payload.as_ref());
                let status = self.status.or_else(|| string_field(self.payload.as_ref(), "status"));
                DomainEvent::StatusChanged(StatusChanged {
                    transaction_id,
                    previous_status: self.previous_status,
                    status,
                    payload: self.payload,
                    message: text,
                    timestamp,
                })
            }
            EventKind::EntityUpdated | EventKind::ParticipantAssigned => {
                let change = TransactionChange {
                    transaction_id: transaction_subject(self.transaction_id, self.payload.as_ref()),
                    payload: self.payload,
                    message: text,
                    timestamp,
                };
                if kind == EventKind::EntityUpdated {
                    DomainEvent::EntityUpdated(change)
                } else {
                    DomainEvent::ParticipantAssigned(change)
                }
            }
            EventKind::UserTyping | EventKind::ReadMarker => {
                let activity = ConversationActivity {
                    conversation_id: id_or_field(self.conversation_id, self.payload.as_ref(), "conversation_id")
                        .and_then(|id| ConversationId::new(id).ok()),
                    user_id: id_or_field(self.user_id, self.payload.as_ref(), "user_id"),
                    timestamp,
                };
                if kind == EventKind::UserTyping {
                    DomainEvent::UserTyping(activity)
                } else {
                    DomainEvent::ReadMarker(activity)
                }
            }
        }
    }
}

/// Transaction events may omit the top-level id when the payload is the
/// transaction itself.
fn transaction_subject(raw: Option<RawId>, payload: Option<&Value>) -> Option<TransactionId> {
    id_or_field(raw, payload, "transaction_id")
        .or_else(|| field_id(payload, "id"))
        .and_then(|id| TransactionId::new(id).ok())
}

fn id_or_field(raw: Option<RawId>, payload: Option<&Value>, field: &str) -> Option<String> {
    raw.and_then(RawId::into_string)
        .or_else(|| field_id(payload, field))
}

fn field_id(payload: Option<&Value>, field: &str) -> Option<String> {
    let value = payload?.get(field)?.clone();
    serde_json::from_value::<RawId>(value).ok()?.into_string()
}

fn string_field(payload: Option<&Value>, field: &str) -> Option<String> {
    payload?.get(field)?.as_str().map(str::to_string)
}
