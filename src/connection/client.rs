//! Reconnecting client - the agent's event-driven state machine
//!
//! All link events pass through [`ReconnectingClient::handle_event`] one at a
//! time. The client owns the connection state and the receive buffer; nothing
//! else mutates them.

use super::session::{ConnectionSession, TextSender};
use crate::command::{decode_bounded, Command, ReceiveBuffer};
use crate::motion::MotionController;
use bytes::Bytes;
use robot_shared::{ConnectionState, LinkEvent, LinkStateMachine, TransitionResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Events delivered by the link manager, in transport order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A connect attempt started
    ConnectInitiated,
    /// The WebSocket handshake completed; `generation` numbers the connection
    Connected { generation: u64 },
    /// The link dropped or the attempt failed
    Disconnected { reason: String },
    /// One inbound message
    DataReceived(Bytes),
}

/// Automatic reconnect policy: fixed delay, no growth, no attempt cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay before the next connect attempt
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Counters kept across connect cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub connects: u64,
    pub registrations_sent: u64,
    pub registration_failures: u64,
    pub commands_dispatched: u64,
    pub unknown_commands: u64,
    pub truncated_payloads: u64,
}

/// Drives registration and command dispatch across disconnects
pub struct ReconnectingClient<M, S> {
    session: ConnectionSession,
    fsm: LinkStateMachine,
    buffer: ReceiveBuffer,
    motion: M,
    sender: S,
    policy: ReconnectPolicy,
    stats: ClientStats,
}

impl<M: MotionController, S: TextSender> ReconnectingClient<M, S> {
    pub fn new(
        session: ConnectionSession,
        motion: M,
        sender: S,
        policy: ReconnectPolicy,
        buffer_capacity: usize,
    ) -> Self {
        Self {
            session,
            fsm: LinkStateMachine::new(),
            buffer: ReceiveBuffer::new(buffer_capacity),
            motion,
            sender,
            policy,
            stats: ClientStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.fsm.state()
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Process one event. Never fails; problems are logged and dropped.
    pub fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::ConnectInitiated => {
                if let TransitionResult::Success(_) = self.transition(LinkEvent::ConnectInitiated) {
                    info!("Connecting as {}", self.session.identity());
                }
            }
            ClientEvent::Connected { generation } => {
                if self.transition(LinkEvent::Connected).entered_connected() {
                    info!("Websocket connected");
                    self.stats.connects += 1;
                    self.sender.set_generation(generation);
                    self.register();
                }
            }
            ClientEvent::Disconnected { reason } => {
                if let TransitionResult::Success(_) = self.transition(LinkEvent::Disconnected) {
                    info!(
                        "Websocket disconnected: {} (reconnecting in {:?})",
                        reason,
                        self.policy.delay()
                    );
                }
            }
            // Data is decoded and dispatched regardless of connection state
            ClientEvent::DataReceived(payload) => self.on_data(&payload),
        }
    }

    fn transition(&mut self, event: LinkEvent) -> TransitionResult {
        let result = self.fsm.process_event(event);
        if let TransitionResult::Invalid { from, event } = result {
            debug!("Ignoring {:?} while {:?}", event, from);
        }
        result
    }

    fn register(&mut self) {
        match self.session.on_connected(&mut self.sender) {
            Ok(()) => {
                self.stats.registrations_sent += 1;
                debug!("Sent {}", self.session.registration());
            }
            Err(e) => {
                // Best effort; the next connect cycle registers again
                self.stats.registration_failures += 1;
                warn!("Failed to send registration: {:#}", e);
            }
        }
    }

    fn on_data(&mut self, payload: &[u8]) {
        if payload.is_empty() {
            debug!("Ignoring empty payload");
            return;
        }

        let limit = self.buffer.limit();
        let text = self.buffer.load(payload);
        if text.len() < payload.len() {
            self.stats.truncated_payloads += 1;
            debug!("Payload truncated from {} to {} bytes", payload.len(), text.len());
        }
        info!("Received: {}", String::from_utf8_lossy(text));

        let command = decode_bounded(text, limit);
        if dispatch(&mut self.motion, &command) {
            self.stats.commands_dispatched += 1;
        } else {
            self.stats.unknown_commands += 1;
        }
    }
}

/// Run the motion action for a command; returns false for `Unknown`
pub fn dispatch<M: MotionController + ?Sized>(motion: &mut M, command: &Command<'_>) -> bool {
    match command {
        Command::Forward => motion.forward(),
        Command::Backward => motion.backward(),
        Command::TurnLeft => motion.turn_left(),
        Command::TurnRight => motion.turn_right(),
        Command::Stop => motion.stop(),
        Command::Unknown(text) => {
            info!("Unknown command: {}", text);
            return false;
        }
    }

    debug!("Dispatched {}", command.name());
    true
}
