use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Lifecycle notifications emitted by the presence client.
///
/// These complement the snapshot channel: the snapshot says *what* the
/// current state is, events say *why* it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresenceEvent {
    Connecting,
    Connected,
    StateApplied { user_id: Option<String> },
    Disconnected { code: u16 },
    ReconnectScheduled { attempt: u32, delay_ms: u64 },
    GaveUp { attempts: u32 },
    Shutdown,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PresenceEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns the number of receivers that saw it.
    pub fn publish(&self, event: PresenceEvent) -> usize {
        trace!(?event, "publishing presence event");
        self.sender.send(event).unwrap_or(0)
    }
}
