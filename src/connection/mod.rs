//! Connection management for the persistent relay link
//!
//! This module handles:
//! - Persistent WebSocket connection with fixed-delay reconnection
//! - Identity registration on every (re)connect
//! - Serialized processing of link events and command dispatch

mod client;
mod manager;
mod session;

pub use client::{dispatch, ClientEvent, ClientStats, ReconnectPolicy, ReconnectingClient};
pub use manager::{LinkConfig, LinkManager, OutboundSender};
pub use session::{ConnectionSession, TextSender};
