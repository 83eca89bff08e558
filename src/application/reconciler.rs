//! Cache reconciliation for pushed domain events.
//!
//! Each event kind maps to a fixed policy of direct writes followed by
//! invalidations:
//!
//! | kind | direct write | invalidated |
//! |---|---|---|
//! | status changed | `status`, `updated_at` into cached detail | detail, transaction list |
//! | entity updated | payload merged into cached detail | detail, transaction list |
//! | participant assigned | - | detail, transaction list |
//! | message received | snapshot merged into cached message list | conversation list |
//! | read marker | - | message list, conversation list |
//! | typing, connected | - | - |
//!
//! Direct writes only touch entries that are already cached; a record the
//! consumer never loaded is left for its next fetch. Applying the same
//! event twice leaves the cache as applying it once.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::cache::{merge_message, optimistic_message, CacheKey, MergeOutcome};
use crate::domain::foundation::{ConversationId, MessageId, Timestamp, TransactionId};
use crate::domain::sync::{
    ConversationActivity, DomainEvent, MessageReceived, StatusChanged, TransactionChange,
};
use crate::ports::EntityCache;

/// Cache keys touched by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub written: Vec<CacheKey>,
    pub invalidated: Vec<CacheKey>,
}

impl Reconciliation {
    /// True when the event left the cache untouched.
    pub fn is_noop(&self) -> bool {
        self.written.is_empty() && self.invalidated.is_empty()
    }
}

/// Applies domain events to the consumer's entity cache.
#[derive(Clone)]
pub struct CacheReconciler {
    cache: Arc<dyn EntityCache>,
}

impl CacheReconciler {
    pub fn new(cache: Arc<dyn EntityCache>) -> Self {
        Self { cache }
    }

    /// Runs one reconciliation pass for an event.
    pub fn apply(&self, event: &DomainEvent) -> Reconciliation {
        let mut pass = Reconciliation::default();
        match event {
            DomainEvent::StatusChanged(e) => self.apply_status_changed(e, &mut pass),
            DomainEvent::EntityUpdated(e) => self.apply_entity_updated(e, &mut pass),
            DomainEvent::ParticipantAssigned(e) => {
                self.invalidate_transaction(e.transaction_id.as_ref(), &mut pass)
            }
            DomainEvent::MessageReceived(e) => self.apply_message_received(e, &mut pass),
            DomainEvent::ReadMarker(e) => self.apply_read_marker(e, &mut pass),
            DomainEvent::UserTyping(_)
            | DomainEvent::ConnectionEstablished { .. }
            | DomainEvent::Unrecognized { .. } => {}
        }

        if !pass.is_noop() {
            tracing::debug!(
                written = pass.written.len(),
                invalidated = pass.invalidated.len(),
                "Cache reconciled"
            );
        }
        pass
    }

    /// Adds a client-side message to a conversation before the server
    /// confirms it.
    ///
    /// The confirmed copy later replaces it in place when it carries the
    /// same content and sender.
    pub fn add_optimistic_message(
        &self,
        conversation_id: &ConversationId,
        content: &str,
        sender_id: &str,
    ) -> MessageId {
        let (id, message) = optimistic_message(conversation_id, content, sender_id);
        let key = CacheKey::ConversationMessages(conversation_id.clone());

        match self.cache.read(&key) {
            None => self.cache.write(key, Value::Array(vec![message])),
            Some(entry) => match entry.value {
                Value::Array(mut messages) => {
                    messages.push(message);
                    self.cache.write(key.clone(), Value::Array(messages));
                    if entry.stale {
                        self.cache.invalidate(&key);
                    }
                }
                _ => {
                    tracing::warn!(key = %key, "Cached message list is not an array, optimistic message not shown");
                }
            },
        }
        id
    }

    fn apply_status_changed(&self, event: &StatusChanged, pass: &mut Reconciliation) {
        let Some(transaction_id) = &event.transaction_id else {
            return;
        };

        let key = CacheKey::Transaction(transaction_id.clone());
        let patched = self.patch_record(&key, |record| {
            if let Some(Value::Object(payload)) = &event.payload {
                merge_fields(record, payload);
            }
            if let Some(status) = &event.status {
                record.insert("status".to_string(), Value::String(status.clone()));
            }
            stamp_updated_at(record, &event.timestamp);
        });
        if patched {
            pass.written.push(key);
        }

        self.invalidate_transaction(Some(transaction_id), pass);
    }

    fn apply_entity_updated(&self, event: &TransactionChange, pass: &mut Reconciliation) {
        let Some(transaction_id) = &event.transaction_id else {
            return;
        };

        if let Some(Value::Object(payload)) = &event.payload {
            let key = CacheKey::Transaction(transaction_id.clone());
            let patched = self.patch_record(&key, |record| {
                merge_fields(record, payload);
                stamp_updated_at(record, &event.timestamp);
            });
            if patched {
                pass.written.push(key);
            }
        }

        self.invalidate_transaction(Some(transaction_id), pass);
    }

    fn apply_message_received(&self, event: &MessageReceived, pass: &mut Reconciliation) {
        if let (Some(conversation_id), Some(snapshot)) = (&event.conversation_id, &event.snapshot)
        {
            let key = CacheKey::ConversationMessages(conversation_id.clone());
            if let Some(entry) = self.cache.read(&key) {
                match entry.value {
                    Value::Array(mut messages) => {
                        match merge_message(&mut messages, snapshot) {
                            MergeOutcome::Skipped => {
                                self.invalidate(key, pass);
                            }
                            outcome => {
                                tracing::debug!(?outcome, conversation_id = %conversation_id, "Message merged");
                                self.cache.write(key.clone(), Value::Array(messages));
                                if entry.stale {
                                    self.cache.invalidate(&key);
                                }
                                pass.written.push(key);
                            }
                        }
                    }
                    _ => self.invalidate(key, pass),
                }
            }
        }

        self.invalidate(CacheKey::Conversations, pass);
    }

    fn apply_read_marker(&self, event: &ConversationActivity, pass: &mut Reconciliation) {
        if let Some(conversation_id) = &event.conversation_id {
            self.invalidate(CacheKey::ConversationMessages(conversation_id.clone()), pass);
        }
        self.invalidate(CacheKey::Conversations, pass);
    }

    fn invalidate_transaction(
        &self,
        transaction_id: Option<&TransactionId>,
        pass: &mut Reconciliation,
    ) {
        let Some(transaction_id) = transaction_id else {
            return;
        };
        self.invalidate(CacheKey::Transaction(transaction_id.clone()), pass);
        self.invalidate(CacheKey::Transactions, pass);
    }

    fn invalidate(&self, key: CacheKey, pass: &mut Reconciliation) {
        self.cache.invalidate(&key);
        pass.invalidated.push(key);
    }

    /// Rewrites a cached object record. Returns false when nothing usable
    /// was cached.
    fn patch_record(&self, key: &CacheKey, patch: impl FnOnce(&mut Map<String, Value>)) -> bool {
        let Some(entry) = self.cache.read(key) else {
            return false;
        };
        let Value::Object(mut record) = entry.value else {
            return false;
        };
        patch(&mut record);
        self.cache.write(key.clone(), Value::Object(record));
        true
    }
}

fn merge_fields(record: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (field, value) in patch {
        record.insert(field.clone(), value.clone());
    }
}

fn stamp_updated_at(record: &mut Map<String, Value>, timestamp: &Timestamp) {
    record.insert(
        "updated_at".to_string(),
        Value::String(timestamp.to_rfc3339()),
    );
}
