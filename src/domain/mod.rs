//! Domain layer containing the sync client's types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, errors)
//! - `sync` - Domain events, connection state, backoff and commands
//! - `cache` - Cache keys and chat message merge rules

pub mod cache;
pub mod foundation;
pub mod sync;
