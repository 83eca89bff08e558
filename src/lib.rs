//! Escrow Sync - Real-time event synchronization client
//!
//! Keeps a marketplace client in step with the server: a server-push
//! connection delivers transaction and chat events, which are reconciled
//! into the consumer's entity cache and forwarded to registered callbacks.
//! Lost connections are recovered with bounded exponential backoff.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{CacheReconciler, EventStreamConnector, SyncCallbacks};
pub use domain::sync::{ConnectionState, ConnectionStatus, DomainEvent, SyncError};
