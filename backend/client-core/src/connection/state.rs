use std::fmt;
use std::time::Duration;

/// Observable lifecycle of the single server connection.
///
/// `Idle` is only re-entered through an explicit disconnect; every other
/// transition is driven by the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Authenticating,
    Connected,
    Disconnected,
    ReconnectScheduled {
        attempt: u32,
        delay: Duration,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// True while the client is still trying to reach a usable connection.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting
                | ConnectionState::Authenticating
                | ConnectionState::ReconnectScheduled { .. }
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Authenticating => write!(f, "authenticating"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::ReconnectScheduled { attempt, delay } => {
                write!(f, "reconnect #{attempt} in {}ms", delay.as_millis())
            }
        }
    }
}
