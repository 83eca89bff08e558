//! Event stream connector.
//!
//! Owns the lifecycle of the server-push connection:
//!
//! ```text
//! connect() ──► Connecting ──► Connected ──► (close) ──► Disconnected ──timer──► connect()
//!                   │                                         │
//!                   └──(open fails)───────────────────────────┘
//!                                                  retries exhausted ──► Failed
//! ```
//!
//! Every `connect()` and `disconnect()` bumps a generation counter; a
//! reader or timer from an older generation never touches the state.
//! Bookkeeping lives behind a std mutex that is never held across an
//! `.await`.

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::foundation::{StateMachine, Timestamp, TransactionId};
use crate::domain::sync::{
    ChatCommand, ConnectionState, ConnectionStatus, DomainEvent, ReconnectPolicy, SyncError,
    CONNECTION_CLOSED,
};
use crate::ports::{
    CommandSink, CredentialProvider, EntityCache, EventTransport, FrameStream, StreamRequest,
};

use super::reconciler::CacheReconciler;

/// Handler for decoded events.
pub type EventCallback = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

/// Handler for terminal connector errors.
pub type ErrorCallback = Arc<dyn Fn(&SyncError) + Send + Sync>;

/// Consumer callbacks; one handler per slot.
#[derive(Clone, Default)]
pub struct SyncCallbacks {
    /// Every recognized event, after reconciliation.
    pub on_message: Option<EventCallback>,

    /// Status changes, entity updates and participant assignments.
    pub on_status_change: Option<EventCallback>,

    /// Invoked once when reconnection gives up.
    pub on_error: Option<ErrorCallback>,
}

struct Lifecycle {
    generation: u64,
    /// False after `disconnect()`; stops scheduled retries.
    enabled: bool,
    subject: Option<TransactionId>,
    reader: Option<JoinHandle<()>>,
    retry: Option<JoinHandle<()>>,
    commands: Option<Arc<dyn CommandSink>>,
}

/// Who asked for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// The consumer; the retry budget starts over.
    Fresh,
    /// The backoff timer; keeps counting toward `max_attempts`.
    Retry,
}

struct ConnectorInner {
    transport: Arc<dyn EventTransport>,
    credentials: Arc<dyn CredentialProvider>,
    reconciler: CacheReconciler,
    policy: ReconnectPolicy,
    lifecycle: Mutex<Lifecycle>,
    callbacks: RwLock<SyncCallbacks>,
    state: watch::Sender<ConnectionState>,
}

/// Keeps one server-push connection alive and feeds its events into the
/// cache and the registered callbacks.
///
/// Dropping the connector closes the connection and cancels any pending
/// reconnect.
///
/// # Example
///
/// ```ignore
/// let connector = EventStreamConnector::new(transport, credentials, cache, ReconnectPolicy::default());
/// connector.set_on_status_change(|event| println!("{:?}", event.subject()));
/// connector.connect().await?;
/// ```
pub struct EventStreamConnector {
    inner: Arc<ConnectorInner>,
}

impl EventStreamConnector {
    pub fn new(
        transport: Arc<dyn EventTransport>,
        credentials: Arc<dyn CredentialProvider>,
        cache: Arc<dyn EntityCache>,
        policy: ReconnectPolicy,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        let inner = ConnectorInner {
            transport,
            credentials,
            reconciler: CacheReconciler::new(cache),
            policy,
            lifecycle: Mutex::new(Lifecycle {
                generation: 0,
                enabled: false,
                subject: None,
                reader: None,
                retry: None,
                commands: None,
            }),
            callbacks: RwLock::new(SyncCallbacks::default()),
            state,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Opens the connection, replacing any existing one.
    ///
    /// A failed open is retried on the backoff schedule; the error is
    /// still returned to the caller.
    ///
    /// Starts a fresh retry budget, including after `Failed`.
    pub async fn connect(&self) -> Result<(), SyncError> {
        self.inner.connect(Attempt::Fresh).await
    }

    /// Closes the connection and cancels any pending reconnect.
    pub async fn disconnect(&self) {
        self.inner.disconnect().await
    }

    /// Reconnects after the client became active again (e.g. a window
    /// regained visibility).
    ///
    /// Only acts when the subscription is enabled, the connection is down
    /// and no retry is already scheduled. Returns whether it reconnected.
    pub async fn resume(&self) -> bool {
        self.inner.resume().await
    }

    /// Sends a chat command over the live connection.
    pub async fn send_command(&self, command: &ChatCommand) -> Result<(), SyncError> {
        self.inner.send_command(command).await
    }

    /// Restricts the next connection to one transaction's events.
    pub fn set_subject(&self, transaction_id: Option<TransactionId>) {
        self.inner.lock().subject = transaction_id;
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Reconciler writing into the consumer's cache.
    pub fn reconciler(&self) -> &CacheReconciler {
        &self.inner.reconciler
    }

    /// Replaces every callback slot at once.
    pub fn set_callbacks(&self, callbacks: SyncCallbacks) {
        *self.inner.callbacks_mut() = callbacks;
    }

    pub fn set_on_message(&self, callback: impl Fn(&DomainEvent) + Send + Sync + 'static) {
        self.inner.callbacks_mut().on_message = Some(Arc::new(callback));
    }

    pub fn set_on_status_change(&self, callback: impl Fn(&DomainEvent) + Send + Sync + 'static) {
        self.inner.callbacks_mut().on_status_change = Some(Arc::new(callback));
    }

    pub fn set_on_error(&self, callback: impl Fn(&SyncError) + Send + Sync + 'static) {
        self.inner.callbacks_mut().on_error = Some(Arc::new(callback));
    }
}

impl Drop for EventStreamConnector {
    fn drop(&mut self) {
        let mut lifecycle = self.inner.lock();
        lifecycle.enabled = false;
        lifecycle.generation += 1;
        lifecycle.commands = None;
        if let Some(retry) = lifecycle.retry.take() {
            retry.abort();
        }
        if let Some(reader) = lifecycle.reader.take() {
            reader.abort();
        }
    }
}

impl ConnectorInner {
    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn callbacks(&self) -> SyncCallbacks {
        self.callbacks
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn callbacks_mut(&self) -> std::sync::RwLockWriteGuard<'_, SyncCallbacks> {
        self.callbacks.write().unwrap_or_else(|p| p.into_inner())
    }

    async fn connect(self: &Arc<Self>, attempt: Attempt) -> Result<(), SyncError> {
        let (generation, previous) = {
            let mut lifecycle = self.lock();
            lifecycle.enabled = true;
            lifecycle.generation += 1;
            lifecycle.commands = None;
            if let Some(retry) = lifecycle.retry.take() {
                retry.abort();
            }
            (lifecycle.generation, lifecycle.reader.take())
        };
        close_reader(previous).await;

        let Some(token) = self.credentials.access_token() else {
            let lifecycle = self.lock();
            if lifecycle.generation == generation {
                self.transition(ConnectionStatus::Disconnected, |state| {
                    state.last_error = Some(SyncError::NoCredentials.to_string());
                    state.next_retry_in = None;
                });
            }
            tracing::warn!(generation, "No access token, not connecting");
            return Err(SyncError::NoCredentials);
        };

        let request = {
            let lifecycle = self.lock();
            if lifecycle.generation != generation {
                return Err(SyncError::Cancelled);
            }
            self.transition(ConnectionStatus::Connecting, |state| {
                if attempt == Attempt::Fresh {
                    state.reconnect_attempt = 0;
                }
                state.next_retry_in = None;
            });
            StreamRequest {
                token,
                transaction_id: lifecycle.subject.clone(),
            }
        };

        tracing::info!(
            generation,
            transaction_id = ?request.transaction_id,
            "Connecting to event stream"
        );

        match self.transport.open(&request).await {
            Ok(opened) => {
                let mut lifecycle = self.lock();
                if lifecycle.generation != generation {
                    tracing::debug!(generation, "Discarding superseded connection");
                    return Err(SyncError::Cancelled);
                }
                self.transition(ConnectionStatus::Connected, |state| {
                    state.reconnect_attempt = 0;
                    state.last_error = None;
                    state.next_retry_in = None;
                });
                lifecycle.commands = opened.commands;
                let reader = tokio::spawn(Arc::clone(self).read_loop(generation, opened.frames));
                lifecycle.reader = Some(reader);

                tracing::info!(generation, "Event stream connected");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "Failed to open event stream");
                self.handle_close(generation);
                Err(SyncError::Transport(e))
            }
        }
    }

    async fn disconnect(&self) {
        let reader = {
            let mut lifecycle = self.lock();
            lifecycle.enabled = false;
            lifecycle.generation += 1;
            lifecycle.commands = None;
            if let Some(retry) = lifecycle.retry.take() {
                retry.abort();
            }
            self.transition(ConnectionStatus::Disconnected, |state| {
                state.next_retry_in = None;
            });
            lifecycle.reader.take()
        };
        close_reader(reader).await;
        tracing::info!("Event stream disconnected");
    }

    async fn resume(self: &Arc<Self>) -> bool {
        let should_reconnect = {
            let lifecycle = self.lock();
            let status = self.state.borrow().status;
            lifecycle.enabled
                && lifecycle.retry.is_none()
                && matches!(
                    status,
                    ConnectionStatus::Disconnected | ConnectionStatus::Failed
                )
        };
        if !should_reconnect {
            return false;
        }

        tracing::info!("Resuming event stream");
        if let Err(e) = self.connect(Attempt::Fresh).await {
            tracing::debug!(error = %e, "Resume did not connect");
        }
        true
    }

    async fn send_command(&self, command: &ChatCommand) -> Result<(), SyncError> {
        let sink = {
            let lifecycle = self.lock();
            if self.state.borrow().is_online() {
                lifecycle.commands.clone()
            } else {
                None
            }
        };
        let sink = sink.ok_or(SyncError::NotConnected)?;
        sink.send(command).await?;
        Ok(())
    }

    async fn read_loop(self: Arc<Self>, generation: u64, mut frames: FrameStream) {
        loop {
            match frames.next().await {
                Some(Ok(raw)) => self.dispatch(&raw),
                Some(Err(e)) => {
                    tracing::warn!(generation, error = %e, "Event stream errored");
                    break;
                }
                None => {
                    tracing::info!(generation, "Event stream closed by server");
                    break;
                }
            }
        }
        drop(frames);
        self.handle_close(generation);
    }

    fn dispatch(&self, raw: &str) {
        let event = match DomainEvent::decode(raw, Timestamp::now()) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed event");
                return;
            }
        };
        let Some(kind) = event.kind() else {
            if let DomainEvent::Unrecognized { kind } = &event {
                tracing::debug!(kind = %kind, "Ignoring unrecognized event");
            }
            return;
        };

        tracing::debug!(kind = kind.as_wire(), subject = ?event.subject(), "Event received");
        self.reconciler.apply(&event);

        let callbacks = self.callbacks();
        if let Some(on_message) = &callbacks.on_message {
            invoke("on_message", || on_message(&event));
        }
        if event.is_status_notification() {
            if let Some(on_status_change) = &callbacks.on_status_change {
                invoke("on_status_change", || on_status_change(&event));
            }
        }
    }

    /// Reacts to the loss of the connection opened by `generation`.
    fn handle_close(self: &Arc<Self>, generation: u64) {
        let exhausted = {
            let mut lifecycle = self.lock();
            if lifecycle.generation != generation || !lifecycle.enabled {
                tracing::debug!(generation, "Ignoring close of superseded connection");
                return;
            }
            lifecycle.reader = None;
            lifecycle.commands = None;

            let attempts = self.state.borrow().reconnect_attempt;
            match self.policy.next_attempt(attempts) {
                Some((attempt, delay)) => {
                    self.transition(ConnectionStatus::Disconnected, |state| {
                        state.reconnect_attempt = attempt;
                        state.last_error = Some(CONNECTION_CLOSED.to_string());
                        state.next_retry_in = Some(delay);
                    });

                    let inner = Arc::clone(self);
                    lifecycle.retry = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        inner.fire_retry(generation).await;
                    }));

                    tracing::info!(
                        generation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Reconnect scheduled"
                    );
                    false
                }
                None => {
                    self.transition(ConnectionStatus::Failed, |state| {
                        state.last_error = Some(SyncError::MaxRetriesExceeded.to_string());
                        state.next_retry_in = None;
                    });
                    true
                }
            }
        };

        if exhausted {
            tracing::error!(
                max_attempts = self.policy.max_attempts,
                "Giving up on event stream"
            );
            if let Some(on_error) = &self.callbacks().on_error {
                invoke("on_error", || on_error(&SyncError::MaxRetriesExceeded));
            }
        }
    }

    fn fire_retry(self: Arc<Self>, generation: u64) -> BoxFuture<'static, ()> {
        async move {
            {
                let mut lifecycle = self.lock();
                if lifecycle.generation != generation || !lifecycle.enabled {
                    return;
                }
                // Detach our own handle; aborting it would cancel this task.
                lifecycle.retry = None;
            }
            if let Err(e) = self.connect(Attempt::Retry).await {
                tracing::debug!(error = %e, "Reconnect attempt failed");
            }
        }
        .boxed()
    }

    /// Moves to `next` and applies further bookkeeping in one update.
    fn transition(&self, next: ConnectionStatus, update: impl FnOnce(&mut ConnectionState)) {
        self.state.send_modify(|state| {
            if state.status != next {
                match state.status.transition_to(next) {
                    Ok(status) => {
                        tracing::debug!(from = %state.status, to = %status, "Connection status changed");
                        state.status = status;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Forcing connection status");
                        state.status = next;
                    }
                }
            }
            update(state);
        });
    }
}

async fn close_reader(reader: Option<JoinHandle<()>>) {
    if let Some(reader) = reader {
        reader.abort();
        let _ = reader.await;
    }
}

fn invoke(slot: &'static str, callback: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        tracing::error!(callback = slot, "Callback panicked");
    }
}
