//! Client configuration and control messages.

use std::time::Duration;

use tokio::sync::oneshot;

use folio_common::defaults;

use crate::backoff::BackoffPolicy;
use crate::machine::MachineConfig;
use crate::snapshot::EditorAllowList;

#[derive(Debug, Clone)]
pub struct PresenceClientConfig {
    pub url: String,
    pub user_id: String,
    pub editor_names: Vec<String>,
    pub backoff: BackoffPolicy,
    pub reconnect_grace: Duration,
    /// `None` waits on the handshake indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Buffered lifecycle events per subscriber.
    pub event_capacity: usize,
}

impl Default for PresenceClientConfig {
    fn default() -> Self {
        Self {
            url: defaults::PRESENCE_URL.to_string(),
            user_id: defaults::USER_ID.to_string(),
            editor_names: defaults::editor_names(),
            backoff: BackoffPolicy::default(),
            reconnect_grace: Duration::from_millis(defaults::RECONNECT_GRACE_MS),
            connect_timeout: None,
            event_capacity: 64,
        }
    }
}

impl PresenceClientConfig {
    pub(crate) fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            user_id: self.user_id.clone(),
            editors: EditorAllowList::new(self.editor_names.iter().cloned()),
            backoff: self.backoff,
            reconnect_grace: self.reconnect_grace,
        }
    }
}

/// Requests from [`PresenceClient`](super::PresenceClient) handles to the driver task.
#[derive(Debug)]
pub(crate) enum Control {
    Connect,
    Disconnect,
    Reconnect,
    /// Disconnect, then stop the driver. The sender fires once it has.
    Shutdown(oneshot::Sender<()>),
}
