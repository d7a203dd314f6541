//! Robot Agent
//!
//! Device-side control agent: keeps a WebSocket link to the relay open,
//! registers the device identity on every connect and turns short text
//! commands into motion actions.

pub mod command;
pub mod config;
pub mod connection;
pub mod motion;
pub mod transport;
