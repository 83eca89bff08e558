//! Connection status and the observable connection state.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Retries exhausted; only an explicit `connect()` leaves this state.
    Failed,
}

impl StateMachine for ConnectionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionStatus::*;
        match self {
            Disconnected => vec![Connecting, Failed],
            Connecting => vec![Connected, Disconnected, Failed],
            Connected => vec![Connecting, Disconnected, Failed],
            Failed => vec![Connecting, Disconnected],
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of the connector's connection bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionState {
    pub status: ConnectionStatus,

    /// Consecutive unexpected closes since the last successful connect.
    pub reconnect_attempt: u32,

    /// Diagnostic text for the most recent failure.
    pub last_error: Option<String>,

    /// Delay of the pending reconnect timer, if one is scheduled.
    pub next_retry_in: Option<Duration>,
}

impl ConnectionState {
    /// Drives the soft online/offline indicator.
    pub fn is_online(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// True while a reconnect timer is pending.
    pub fn is_retry_pending(&self) -> bool {
        self.next_retry_in.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionStatus::*;

    #[test]
    fn default_state_is_disconnected_and_clean() {
        let state = ConnectionState::default();
        assert_eq!(state.status, Disconnected);
        assert_eq!(state.reconnect_attempt, 0);
        assert!(state.last_error.is_none());
        assert!(!state.is_retry_pending());
    }

    #[test]
    fn only_connected_is_online() {
        for status in [Disconnected, Connecting, Failed] {
            let state = ConnectionState {
                status,
                ..Default::default()
            };
            assert!(!state.is_online());
        }
        let state = ConnectionState {
            status: Connected,
            ..Default::default()
        };
        assert!(state.is_online());
    }

    #[test]
    fn connect_path_transitions_are_valid() {
        assert_eq!(Disconnected.transition_to(Connecting), Ok(Connecting));
        assert_eq!(Connecting.transition_to(Connected), Ok(Connected));
        assert_eq!(Connected.transition_to(Disconnected), Ok(Disconnected));
    }

    #[test]
    fn failed_requires_explicit_connect_or_disconnect() {
        assert!(Failed.can_transition_to(&Connecting));
        assert!(Failed.can_transition_to(&Disconnected));
        assert!(!Failed.can_transition_to(&Connected));
    }

    #[test]
    fn cannot_skip_connecting() {
        assert!(Disconnected.transition_to(Connected).is_err());
    }

    #[test]
    fn no_status_is_terminal() {
        for status in [Disconnected, Connecting, Connected, Failed] {
            assert!(!status.is_terminal(), "{:?} should have exits", status);
        }
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(Connected.to_string(), "connected");
        assert_eq!(Failed.to_string(), "failed");
    }
}
