//! Cloneable handle to the background presence driver.

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use folio_common::{EventBus, PresenceEvent};

use crate::machine::ConnectionState;
use crate::snapshot::PresenceSnapshot;

use super::driver::Driver;
use super::types::{Control, PresenceClientConfig};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for controlling the presence connection and reading its state.
///
/// Control methods are fire-and-forget: they queue a request for the
/// driver task and return. State is read from watch channels, so
/// observers always see the latest value without polling the socket.
#[derive(Clone)]
pub struct PresenceClient {
    control_tx: mpsc::Sender<Control>,
    snapshot_rx: watch::Receiver<PresenceSnapshot>,
    state_rx: watch::Receiver<ConnectionState>,
    events: EventBus,
}

impl PresenceClient {
    /// Start the driver task. Must be called inside a tokio runtime.
    ///
    /// The client starts idle; call [`connect`](Self::connect) to open the
    /// socket.
    pub fn spawn(config: PresenceClientConfig) -> Self {
        let (control_tx, control_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(PresenceSnapshot::default());
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let events = EventBus::new(config.event_capacity);

        let driver = Driver::new(&config, control_rx, snapshot_tx, state_tx, events.clone());
        tokio::spawn(driver.run());

        Self {
            control_tx,
            snapshot_rx,
            state_rx,
            events,
        }
    }

    /// Open the socket unless one is already live.
    pub async fn connect(&self) {
        let _ = self.control_tx.send(Control::Connect).await;
    }

    /// Close with code 1000 and cancel any pending reconnect.
    pub async fn disconnect(&self) {
        let _ = self.control_tx.send(Control::Disconnect).await;
    }

    /// Disconnect, then connect again after a short grace period.
    pub async fn reconnect(&self) {
        let _ = self.control_tx.send(Control::Reconnect).await;
    }

    /// Disconnect and stop the driver, waiting until it has exited.
    ///
    /// Other handles stay valid but their control calls become no-ops.
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.control_tx.send(Control::Shutdown(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> PresenceSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<PresenceSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Lifecycle events published from now on.
    pub fn events(&self) -> broadcast::Receiver<PresenceEvent> {
        self.events.subscribe()
    }
}
