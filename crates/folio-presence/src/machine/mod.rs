//! Sans-IO connection state machine.
//!
//! [`PresenceMachine::handle`] consumes one [`Input`] and returns the
//! [`Command`]s the driver must execute. The machine never touches a
//! socket or a timer itself, so every transition is testable without I/O.

mod types;


pub use types::{Command, ConnectionState, Input, MachineConfig, Phase};

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use folio_common::PresenceEvent;

use crate::backoff::Backoff;
use crate::protocol::{parse_frame, InboundMessage, OutboundMessage, CLOSE_ABNORMAL, CLOSE_NORMAL};
use crate::snapshot::PresenceSnapshot;

const MANUAL_CLOSE_REASON: &str = "Manual disconnect";

pub struct PresenceMachine {
    config: MachineConfig,
    phase: Phase,
    backoff: Backoff,
    snapshot: PresenceSnapshot,
    heartbeat: Option<Duration>,
    reconnect_pending: bool,
}

impl PresenceMachine {
    pub fn new(config: MachineConfig) -> Self {
        let backoff = Backoff::new(config.backoff);
        Self {
            config,
            phase: Phase::Idle,
            backoff,
            snapshot: PresenceSnapshot::default(),
            heartbeat: None,
            reconnect_pending: false,
        }
    }

    pub fn snapshot(&self) -> &PresenceSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.phase.into()
    }

    /// Consecutive reconnects scheduled since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.backoff.attempts()
    }

    /// Period of the running heartbeat ticker, if any.
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    pub fn handle(&mut self, input: Input) -> Vec<Command> {
        trace!(phase = ?self.phase, ?input, "handling input");
        match input {
            Input::Connect => self.on_connect(true),
            Input::ReconnectTimerFired => {
                if !self.reconnect_pending {
                    debug!("stale reconnect timer ignored");
                    return Vec::new();
                }
                self.on_connect(false)
            }
            Input::Disconnect => self.on_disconnect(),
            Input::Reconnect => self.on_reconnect(),
            Input::Opened => self.on_opened(),
            Input::ConnectFailed(reason) => {
                warn!(%reason, "presence socket could not be opened");
                self.on_transport_down(CLOSE_ABNORMAL, true)
            }
            Input::Frame(text) => self.on_frame(&text),
            Input::Closed { code } => self.on_transport_down(code, false),
            Input::Errored(reason) => {
                warn!(%reason, "presence socket error");
                self.on_transport_down(CLOSE_ABNORMAL, false)
            }
            Input::HeartbeatTick => self.on_heartbeat_tick(),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn on_connect(&mut self, explicit: bool) -> Vec<Command> {
        if matches!(self.phase, Phase::Connecting | Phase::Open) {
            debug!(phase = ?self.phase, "connect ignored, connection already live");
            return Vec::new();
        }

        let mut commands = Vec::new();
        if explicit && self.reconnect_pending {
            commands.push(Command::CancelReconnect);
        }
        self.reconnect_pending = false;

        self.phase = Phase::Connecting;
        self.snapshot.is_loading = true;
        info!(attempt = self.backoff.attempts(), "connecting to presence relay");

        commands.push(Command::Notify(PresenceEvent::Connecting));
        commands.push(Command::OpenSocket);
        commands
    }

    fn on_opened(&mut self) -> Vec<Command> {
        if self.phase != Phase::Connecting {
            debug!(phase = ?self.phase, "open event ignored");
            return Vec::new();
        }

        self.phase = Phase::Open;
        self.backoff.reset();
        self.snapshot.is_connected = true;
        info!(user_id = %self.config.user_id, "presence socket open, subscribing");

        vec![
            Command::Send(OutboundMessage::Subscribe {
                user_id: self.config.user_id.clone(),
            }),
            Command::Notify(PresenceEvent::Connected),
        ]
    }

    fn on_frame(&mut self, text: &str) -> Vec<Command> {
        if self.phase != Phase::Open {
            debug!(phase = ?self.phase, "frame ignored outside open phase");
            return Vec::new();
        }

        let message = match parse_frame(text) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "dropping unreadable frame");
                return Vec::new();
            }
        };

        match message {
            InboundMessage::Hello { heartbeat_interval } => {
                let mut commands = Vec::new();
                if self.heartbeat.is_some() {
                    commands.push(Command::StopHeartbeat);
                }
                self.heartbeat = Some(heartbeat_interval);
                debug!(interval_ms = heartbeat_interval.as_millis() as u64, "heartbeat negotiated");
                commands.push(Command::StartHeartbeat(heartbeat_interval));
                commands
            }
            InboundMessage::Dispatch { kind, data } => {
                self.snapshot.apply(&data, &self.config.editors);
                self.snapshot.is_loading = false;
                debug!(?kind, status = self.snapshot.status.as_str(), "presence state applied");
                vec![Command::Notify(PresenceEvent::StateApplied {
                    user_id: self.snapshot.user.as_ref().map(|u| u.id.clone()),
                })]
            }
            InboundMessage::Ignored { op, tag } => {
                trace!(op, ?tag, "frame not relevant");
                Vec::new()
            }
        }
    }

    fn on_heartbeat_tick(&mut self) -> Vec<Command> {
        if self.phase != Phase::Open || self.heartbeat.is_none() {
            trace!(phase = ?self.phase, "heartbeat skipped, socket not open");
            return Vec::new();
        }
        vec![Command::Send(OutboundMessage::Heartbeat)]
    }

    /// Shared path for close, error, and failed construction.
    fn on_transport_down(&mut self, code: u16, clear_loading: bool) -> Vec<Command> {
        if !matches!(self.phase, Phase::Connecting | Phase::Open) {
            debug!(phase = ?self.phase, code, "close ignored, no live connection");
            return Vec::new();
        }

        self.phase = Phase::Closed;
        self.snapshot.is_connected = false;
        if clear_loading {
            self.snapshot.is_loading = false;
        }

        let mut commands = Vec::new();
        if self.heartbeat.take().is_some() {
            commands.push(Command::StopHeartbeat);
        }
        commands.push(Command::Notify(PresenceEvent::Disconnected { code }));

        if code == CLOSE_NORMAL {
            info!("presence socket closed normally");
            return commands;
        }

        match self.backoff.next_retry() {
            Some((attempt, delay)) => {
                info!(code, attempt, delay_ms = delay.as_millis() as u64, "scheduling reconnect");
                self.reconnect_pending = true;
                commands.push(Command::ScheduleReconnect(delay));
                commands.push(Command::Notify(PresenceEvent::ReconnectScheduled {
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                }));
            }
            None => {
                warn!(
                    attempts = self.backoff.attempts(),
                    "reconnect budget exhausted, presence unavailable"
                );
                commands.push(Command::Notify(PresenceEvent::GaveUp {
                    attempts: self.backoff.attempts(),
                }));
            }
        }
        commands
    }

    fn on_disconnect(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();

        if self.reconnect_pending {
            self.reconnect_pending = false;
            commands.push(Command::CancelReconnect);
        }
        if self.heartbeat.take().is_some() {
            commands.push(Command::StopHeartbeat);
        }
        if matches!(self.phase, Phase::Connecting | Phase::Open) {
            info!("disconnecting from presence relay");
            commands.push(Command::CloseSocket {
                code: CLOSE_NORMAL,
                reason: MANUAL_CLOSE_REASON,
            });
            commands.push(Command::Notify(PresenceEvent::Disconnected {
                code: CLOSE_NORMAL,
            }));
        }

        self.phase = Phase::Closed;
        self.snapshot.is_connected = false;
        commands
    }

    fn on_reconnect(&mut self) -> Vec<Command> {
        let mut commands = self.on_disconnect();
        let delay = self.config.reconnect_grace;
        self.reconnect_pending = true;
        debug!(delay_ms = delay.as_millis() as u64, "manual reconnect scheduled");
        commands.push(Command::ScheduleReconnect(delay));
        commands
    }
}
