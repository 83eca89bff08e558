//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait and the
//! validation error shared by the sync and cache modules.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConversationId, MessageId, TransactionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

pub(crate) use ids::RawId;
pub(crate) use timestamp::RawTimestamp;
