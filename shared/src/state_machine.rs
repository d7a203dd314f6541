//! Connection State Machine
//!
//! Defines the valid link transitions for a reconnecting client. State only
//! changes in response to events delivered by the transport.

/// Lifecycle state of the link to the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connect attempt was started (startup or automatic reconnect)
    ConnectInitiated,
    /// The transport finished its handshake
    Connected,
    /// The link went away or the attempt failed
    Disconnected,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(ConnectionState),
    /// Transition was invalid from current state; state is unchanged
    Invalid {
        from: ConnectionState,
        event: LinkEvent,
    },
}

impl TransitionResult {
    /// True when this transition entered `Connected`
    pub fn entered_connected(&self) -> bool {
        matches!(self, TransitionResult::Success(ConnectionState::Connected))
    }
}

/// Tracks the single connection state owned by a client
#[derive(Debug, Default)]
pub struct LinkStateMachine {
    current_state: ConnectionState,
}

impl LinkStateMachine {
    /// Create a new state machine in Disconnected state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> ConnectionState {
        self.current_state
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: LinkEvent) -> TransitionResult {
        match self.next_state(event) {
            Some(state) => {
                self.current_state = state;
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.current_state,
                event,
            },
        }
    }

    fn next_state(&self, event: LinkEvent) -> Option<ConnectionState> {
        use ConnectionState::*;

        match (self.current_state, event) {
            (Disconnected, LinkEvent::ConnectInitiated) => Some(Connecting),

            (Connecting, LinkEvent::Connected) => Some(Connected),
            // A transport that skips reporting the attempt goes straight to Connected
            (Disconnected, LinkEvent::Connected) => Some(Connected),

            (Connecting | Connected, LinkEvent::Disconnected) => Some(Disconnected),

            _ => None,
        }
    }
}
