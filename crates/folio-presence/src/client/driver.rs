//! Background task that executes machine commands against a real socket.
//!
//! One task owns the socket, the heartbeat ticker, and the reconnect timer,
//! so each exists at most once by construction.

use std::future::{pending, Future};
use std::pin::Pin;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use folio_common::{EventBus, PresenceError, PresenceEvent};

use crate::machine::{Command, ConnectionState, Input, PresenceMachine};
use crate::protocol::{CLOSE_ABNORMAL, CLOSE_NO_STATUS};
use crate::snapshot::PresenceSnapshot;

use super::types::{Control, PresenceClientConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CLOSE_REPLY_TIMEOUT: Duration = Duration::from_secs(1);
type ConnectFuture = Pin<Box<dyn Future<Output = Result<WsStream, PresenceError>> + Send>>;

pub(crate) struct Driver {
    url: String,
    connect_timeout: Option<Duration>,
    machine: PresenceMachine,
    control_rx: mpsc::Receiver<Control>,
    socket: Option<WsStream>,
    connecting: Option<ConnectFuture>,
    heartbeat: Option<Interval>,
    reconnect: Option<Pin<Box<Sleep>>>,
    snapshot_tx: watch::Sender<PresenceSnapshot>,
    state_tx: watch::Sender<ConnectionState>,
    events: EventBus,
}

impl Driver {
    pub(crate) fn new(
        config: &PresenceClientConfig,
        control_rx: mpsc::Receiver<Control>,
        snapshot_tx: watch::Sender<PresenceSnapshot>,
        state_tx: watch::Sender<ConnectionState>,
        events: EventBus,
    ) -> Self {
        Self {
            url: config.url.clone(),
            connect_timeout: config.connect_timeout,
            machine: PresenceMachine::new(config.machine_config()),
            control_rx,
            socket: None,
            connecting: None,
            heartbeat: None,
            reconnect: None,
            snapshot_tx,
            state_tx,
            events,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(url = %self.url, "presence driver started");

        loop {
            tokio::select! {
                control = self.control_rx.recv() => match control {
                    Some(Control::Connect) => self.dispatch(Input::Connect).await,
                    Some(Control::Disconnect) => self.dispatch(Input::Disconnect).await,
                    Some(Control::Reconnect) => self.dispatch(Input::Reconnect).await,
                    Some(Control::Shutdown(done)) => {
                        self.dispatch(Input::Disconnect).await;
                        self.events.publish(PresenceEvent::Shutdown);
                        let _ = done.send(());
                        break;
                    }
                    None => {
                        debug!("all client handles dropped");
                        self.dispatch(Input::Disconnect).await;
                        break;
                    }
                },

                result = await_connect(&mut self.connecting) => {
                    self.connecting = None;
                    match result {
                        Ok(ws) => {
                            self.socket = Some(ws);
                            self.dispatch(Input::Opened).await;
                        }
                        Err(e) => self.dispatch(Input::ConnectFailed(e.to_string())).await,
                    }
                }

                frame = next_frame(&mut self.socket) => {
                    if let Some(input) = self.read_input(frame).await {
                        self.dispatch(input).await;
                    }
                }

                _ = next_tick(&mut self.heartbeat) => {
                    self.dispatch(Input::HeartbeatTick).await;
                }

                _ = timer_fired(&mut self.reconnect) => {
                    self.reconnect = None;
                    self.dispatch(Input::ReconnectTimerFired).await;
                }
            }
        }

        info!("presence driver stopped");
    }

    /// Map one read result onto a machine input, dropping the socket when
    /// the stream is finished.
    async fn read_input(&mut self, frame: Option<Result<Message, WsError>>) -> Option<Input> {
        match frame {
            Some(Ok(Message::Text(text))) => Some(Input::Frame(text.as_str().to_owned())),
            Some(Ok(Message::Close(close))) => {
                let code = close.map_or(CLOSE_NO_STATUS, |f| u16::from(f.code));
                debug!(code, "presence socket closed by peer");
                if let Some(ws) = self.socket.take() {
                    finish_close_handshake(ws).await;
                }
                Some(Input::Closed { code })
            }
            Some(Ok(other)) => {
                trace!(kind = message_kind(&other), "non-text frame ignored");
                None
            }
            Some(Err(e)) => {
                self.socket = None;
                Some(Input::Errored(e.to_string()))
            }
            None => {
                self.socket = None;
                Some(Input::Closed {
                    code: CLOSE_ABNORMAL,
                })
            }
        }
    }

    /// Observers see the new state before any event describing it.
    async fn dispatch(&mut self, input: Input) {
        let commands = self.machine.handle(input);
        self.publish();
        for command in commands {
            self.execute(command).await;
        }
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::OpenSocket => {
                self.socket = None;
                self.connecting = Some(Box::pin(open_socket(
                    self.url.clone(),
                    self.connect_timeout,
                )));
            }
            Command::Send(message) => {
                let Some(ws) = self.socket.as_mut() else {
                    debug!(?message, "no socket, outbound frame dropped");
                    return;
                };
                if let Err(e) = ws.send(Message::Text(message.encode().into())).await {
                    // The read side reports the failure as a close or error.
                    warn!(error = %e, "failed to send presence frame");
                }
            }
            Command::CloseSocket { code, reason } => {
                self.connecting = None;
                if let Some(mut ws) = self.socket.take() {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.into(),
                    };
                    if let Err(e) = ws.close(Some(frame)).await {
                        debug!(error = %e, "close handshake failed");
                    }
                }
            }
            Command::StartHeartbeat(period) => {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.heartbeat = Some(ticker);
            }
            Command::StopHeartbeat => self.heartbeat = None,
            Command::ScheduleReconnect(delay) => {
                self.reconnect = Some(Box::pin(tokio::time::sleep(delay)));
            }
            Command::CancelReconnect => self.reconnect = None,
            Command::Notify(event) => {
                self.events.publish(event);
            }
        }
    }

    /// Push the machine's view to observers, waking them only on change.
    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == *snapshot {
                return false;
            }
            *current = snapshot.clone();
            true
        });

        let state = self.machine.connection_state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}

/// Send the close reply tungstenite queued while reading the peer's close
/// frame, then drop the socket.
async fn finish_close_handshake(mut ws: WsStream) {
    match tokio::time::timeout(CLOSE_REPLY_TIMEOUT, ws.flush()).await {
        Ok(Ok(())) => trace!("close reply sent"),
        Ok(Err(e)) => debug!(error = %e, "close reply failed"),
        Err(_) => debug!("close reply timed out"),
    }
}

async fn open_socket(url: String, timeout: Option<Duration>) -> Result<WsStream, PresenceError> {
    let handshake = tokio_tungstenite::connect_async(url);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, handshake)
            .await
            .map_err(|_| PresenceError::ConnectTimeout(limit.as_secs()))?,
        None => handshake.await,
    };
    let (ws, _response) = result.map_err(|e| PresenceError::Transport(e.to_string()))?;
    Ok(ws)
}

// ---------------------------------------------------------------------------
// Optional select! sources. A missing source never completes.
// ---------------------------------------------------------------------------

async fn await_connect(connecting: &mut Option<ConnectFuture>) -> Result<WsStream, PresenceError> {
    match connecting {
        Some(fut) => fut.await,
        None => pending().await,
    }
}

async fn next_frame(socket: &mut Option<WsStream>) -> Option<Result<Message, WsError>> {
    match socket {
        Some(ws) => ws.next().await,
        None => pending().await,
    }
}

async fn next_tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

async fn timer_fired(reconnect: &mut Option<Pin<Box<Sleep>>>) {
    match reconnect {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
