//! `escrow-sync` - streams marketplace events and logs them until Ctrl-C.

use std::sync::Arc;

use escrow_sync::adapters::{InMemoryEntityCache, SseTransport};
use escrow_sync::config::{AppConfig, LoggingConfig};
use escrow_sync::{DomainEvent, EventStreamConnector, SyncCallbacks, SyncError};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.is_json() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_logging(&config.logging);

    let transport = SseTransport::new(config.stream.sse_config())?;
    let cache = Arc::new(InMemoryEntityCache::new());
    let connector = EventStreamConnector::new(
        Arc::new(transport),
        config.credentials.provider(),
        cache.clone(),
        config.reconnect.policy(),
    );
    connector.set_subject(config.stream.subject()?);

    connector.set_callbacks(SyncCallbacks {
        on_message: Some(Arc::new(|event: &DomainEvent| {
            tracing::info!(
                kind = event.kind().map(|k| k.as_wire()).unwrap_or("unknown"),
                subject = ?event.subject(),
                "Event"
            );
        })),
        on_status_change: Some(Arc::new(|event: &DomainEvent| {
            if let DomainEvent::StatusChanged(change) = event {
                tracing::info!(
                    transaction_id = ?change.transaction_id,
                    from = ?change.previous_status,
                    to = ?change.status,
                    "Transaction status changed"
                );
            }
        })),
        on_error: Some(Arc::new(|error: &SyncError| {
            tracing::error!(error = %error, "Event stream gave up");
        })),
    });

    if let Err(e) = connector.connect().await {
        match e {
            SyncError::NoCredentials => return Err(e.into()),
            other => tracing::warn!(error = %other, "Initial connect failed, retrying"),
        }
    }

    tokio::signal::ctrl_c().await?;
    connector.disconnect().await;
    tracing::info!(cached_entries = cache.len(), "Shut down");
    Ok(())
}
