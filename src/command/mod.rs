//! Command decoding for the robot agent
//!
//! This module handles:
//! - Bounding untrusted payloads into a fixed receive buffer
//! - Mapping command text onto the closed set of motion commands

mod buffer;
mod decoder;

pub use buffer::ReceiveBuffer;
pub use decoder::{decode, decode_bounded, Command};
