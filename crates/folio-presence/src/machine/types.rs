//! Inputs, commands, and phases of the connection state machine.

use std::time::Duration;

use serde::Serialize;

use folio_common::{defaults, PresenceEvent};

use crate::backoff::BackoffPolicy;
use crate::protocol::OutboundMessage;
use crate::snapshot::EditorAllowList;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Account id sent in the subscribe frame.
    pub user_id: String,
    pub editors: EditorAllowList,
    pub backoff: BackoffPolicy,
    /// Pause between the two halves of a manual reconnect.
    pub reconnect_grace: Duration,
}

impl MachineConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            editors: EditorAllowList::default(),
            backoff: BackoffPolicy::default(),
            reconnect_grace: Duration::from_millis(defaults::RECONNECT_GRACE_MS),
        }
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Internal lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Never connected.
    Idle,
    Connecting,
    /// Socket open and subscribe sent.
    Open,
    /// Previous attempt ended; a reconnect may be pending.
    Closed,
}

/// Coarse connection state exposed to observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl From<Phase> for ConnectionState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle | Phase::Closed => ConnectionState::Disconnected,
            Phase::Connecting => ConnectionState::Connecting,
            Phase::Open => ConnectionState::Connected,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs & Commands
// ---------------------------------------------------------------------------

/// Everything that can happen to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Explicit `connect()` from the application.
    Connect,
    /// Explicit `disconnect()` from the application.
    Disconnect,
    /// Explicit `reconnect()` from the application.
    Reconnect,
    /// The pending reconnect timer elapsed.
    ReconnectTimerFired,
    /// The socket handshake completed.
    Opened,
    /// The socket could not be established.
    ConnectFailed(String),
    /// A text frame arrived.
    Frame(String),
    /// The socket closed with `code`.
    Closed { code: u16 },
    /// The transport failed mid-stream.
    Errored(String),
    /// The heartbeat ticker fired.
    HeartbeatTick,
}

/// Side effects the driver must carry out, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenSocket,
    Send(OutboundMessage),
    CloseSocket { code: u16, reason: &'static str },
    /// Replace any running ticker with one at this period.
    StartHeartbeat(Duration),
    StopHeartbeat,
    /// Replace any pending reconnect timer with one of this delay.
    ScheduleReconnect(Duration),
    CancelReconnect,
    Notify(PresenceEvent),
}
