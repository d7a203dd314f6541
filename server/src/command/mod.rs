//! Message routing for the relay
//!
//! This module handles:
//! - Recording robot registrations
//! - Forwarding controller commands to the target robot

mod dispatcher;

pub use dispatcher::{CommandDispatcher, RouteOutcome};
