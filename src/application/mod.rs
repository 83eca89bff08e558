//! Application layer - Connection lifecycle and cache reconciliation.
//!
//! Coordinates the ports: the connector drives the transport and hands
//! every decoded event to the reconciler before the consumer callbacks.

mod connector;
mod reconciler;

pub use connector::{ErrorCallback, EventCallback, EventStreamConnector, SyncCallbacks};
pub use reconciler::{CacheReconciler, Reconciliation};
