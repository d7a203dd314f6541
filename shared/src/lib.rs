//! Robot Link Shared Types
//!
//! This crate provides the wire vocabulary spoken between robot agents and the
//! relay server, plus the connection state machine driven by the agent.

pub mod protocol;
pub mod state_machine;

pub use protocol::{registration_message, DeviceIdentity, ProtocolError, RelayMessage};
pub use state_machine::{ConnectionState, LinkEvent, LinkStateMachine, TransitionResult};

/// Link parameters shared by agent defaults and tests
pub mod link {
    /// Fixed delay between a disconnect and the next connect attempt
    pub const RECONNECT_DELAY_MS: u64 = 5000;

    /// Receive buffer size, including one byte reserved for the terminator
    pub const RECEIVE_BUFFER_CAPACITY: usize = 64;

    /// Largest command payload decoded, in bytes
    pub const MAX_COMMAND_LEN: usize = RECEIVE_BUFFER_CAPACITY - 1;

    /// Upper bound accepted for a configured receive buffer
    pub const MAX_RECEIVE_BUFFER_CAPACITY: usize = 4096;
}
