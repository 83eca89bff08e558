//! Cache keys and entries for the consumer-owned entity cache.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::{ConversationId, TransactionId};

/// Key of a cached collection or record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CacheKey {
    /// List of all transactions visible to the user.
    Transactions,
    /// Detail record of one transaction.
    Transaction(TransactionId),
    /// List of the user's conversations (previews, unread counts).
    Conversations,
    /// Message list of one conversation.
    ConversationMessages(ConversationId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Transactions => write!(f, "transactions"),
            CacheKey::Transaction(id) => write!(f, "transactions/{}", id),
            CacheKey::Conversations => write!(f, "conversations"),
            CacheKey::ConversationMessages(id) => write!(f, "conversations/{}/messages", id),
        }
    }
}

/// A cached value plus its staleness flag.
///
/// Stale entries are refetched on next access instead of trusted as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub value: Value,
    pub stale: bool,
}

impl CacheEntry {
    /// Creates a fresh entry.
    pub fn fresh(value: Value) -> Self {
        Self {
            value,
            stale: false,
        }
    }
}
