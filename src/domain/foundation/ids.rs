//! Strongly-typed identifier value objects.
//!
//! Identifiers are assigned by the server and treated as opaque strings.
//! The wire format may carry them as JSON strings or numbers; both decode
//! to the same identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if empty.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

opaque_id!(
    /// Identifier of an escrow transaction.
    TransactionId,
    "transaction_id"
);

opaque_id!(
    /// Identifier of a chat conversation between counterparties.
    ConversationId,
    "conversation_id"
);

opaque_id!(
    /// Identifier of a single chat message.
    MessageId,
    "message_id"
);

impl MessageId {
    /// Prefix marking ids generated client-side for optimistic messages.
    pub const TEMPORARY_PREFIX: &'static str = "temp-";

    /// Generates a fresh temporary id for an optimistic message.
    pub fn temporary() -> Self {
        Self(format!("{}{}", Self::TEMPORARY_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Returns true if the id was generated client-side.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(Self::TEMPORARY_PREFIX)
    }
}

/// Identifier as it appears on the wire: a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    /// Normalizes to the string form, rejecting blank strings.
    pub(crate) fn into_string(self) -> Option<String> {
        match self {
            RawId::Text(s) if s.trim().is_empty() => None,
            RawId::Text(s) => Some(s),
            RawId::Number(n) => Some(n.to_string()),
        }
    }
}
