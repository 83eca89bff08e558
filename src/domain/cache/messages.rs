//! Merge rules for cached chat message lists.
//!
//! A message list is a JSON array of message objects. Only `id`,
//! `content` and `sender_id` are inspected: `id` for deduplication, the
//! other two to recognize the optimistic copy of a message the user sent.

use serde_json::{json, Value};

use crate::domain::foundation::{ConversationId, MessageId, RawId, Timestamp};

/// What merging an incoming message did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A message with the same id was overwritten in place.
    Replaced(usize),
    /// A matching optimistic message was swapped for the confirmed one.
    ResolvedOptimistic(usize),
    Appended,
    /// The snapshot has no id, so it cannot be merged safely.
    Skipped,
}

/// Merges a confirmed message into a cached list.
///
/// Merging the same message twice leaves the list as merging it once.
pub fn merge_message(messages: &mut Vec<Value>, incoming: &Value) -> MergeOutcome {
    let Some(id) = message_id(incoming) else {
        return MergeOutcome::Skipped;
    };

    if let Some(index) = messages
        .iter()
        .position(|m| message_id(m).as_deref() == Some(id.as_str()))
    {
        messages[index] = incoming.clone();
        return MergeOutcome::Replaced(index);
    }

    if let Some(index) = messages.iter().position(|m| is_optimistic_copy(m, incoming)) {
        messages[index] = incoming.clone();
        return MergeOutcome::ResolvedOptimistic(index);
    }

    messages.push(incoming.clone());
    MergeOutcome::Appended
}

/// Builds a client-side message shown before the server confirms it.
pub fn optimistic_message(
    conversation_id: &ConversationId,
    content: &str,
    sender_id: &str,
) -> (MessageId, Value) {
    let id = MessageId::temporary();
    let value = json!({
        "id": id.as_str(),
        "conversation_id": conversation_id.as_str(),
        "content": content,
        "sender_id": sender_id,
        "created_at": Timestamp::now().to_rfc3339(),
        "optimistic": true,
    });
    (id, value)
}

fn message_id(message: &Value) -> Option<String> {
    let raw = message.get("id")?.clone();
    serde_json::from_value::<RawId>(raw).ok()?.into_string()
}

fn is_optimistic_copy(cached: &Value, incoming: &Value) -> bool {
    let temporary = message_id(cached)
        .map(|id| id.starts_with(MessageId::TEMPORARY_PREFIX))
        .unwrap_or(false);
    temporary
        && same_field(cached, incoming, "content")
        && same_field(cached, incoming, "sender_id")
}

/// Compares scalar fields, treating `7` and `"7"` as equal.
fn same_field(a: &Value, b: &Value, field: &str) -> bool {
    match (a.get(field).and_then(scalar_text), b.get(field).and_then(scalar_text)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
