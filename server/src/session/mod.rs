//! Session management for connected robots and controllers
//!
//! This module handles:
//! - Serving each WebSocket connection
//! - Tracking which connection belongs to which robot
//! - Routing text to a specific robot

mod connection;
mod manager;

pub use connection::{run_session, SessionHandle};
pub use manager::SessionManager;
