//! Command decoder - maps raw payload bytes onto motion commands

use robot_shared::link::MAX_COMMAND_LEN;
use std::borrow::Cow;

/// A decoded motion instruction
///
/// `Unknown` borrows the (bounded) payload text, so decoding never allocates
/// for valid UTF-8 input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
    Unknown(Cow<'a, str>),
}

impl Command<'_> {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Forward => "forward",
            Command::Backward => "backward",
            Command::TurnLeft => "turn_left",
            Command::TurnRight => "turn_right",
            Command::Stop => "stop",
            Command::Unknown(_) => "unknown",
        }
    }
}

/// Case-insensitive vocabulary; `BACK` and `BACKWARD` are aliases
const VOCABULARY: &[(&str, Command<'static>)] = &[
    ("FORWARD", Command::Forward),
    ("BACK", Command::Backward),
    ("BACKWARD", Command::Backward),
    ("LEFT", Command::TurnLeft),
    ("RIGHT", Command::TurnRight),
    ("STOP", Command::Stop),
];

/// Decode a payload, reading at most [`MAX_COMMAND_LEN`] bytes
pub fn decode(payload: &[u8]) -> Command<'_> {
    decode_bounded(payload, MAX_COMMAND_LEN)
}

/// Decode a payload, reading at most `limit` bytes
///
/// The text ends at the limit or at the first NUL byte, whichever comes first.
/// Every input maps to a variant; unrecognized text is `Unknown`.
pub fn decode_bounded(payload: &[u8], limit: usize) -> Command<'_> {
    let bounded = &payload[..payload.len().min(limit)];
    let text = match bounded.iter().position(|b| *b == 0) {
        Some(nul) => &bounded[..nul],
        None => bounded,
    };

    VOCABULARY
        .iter()
        .find(|(word, _)| text.eq_ignore_ascii_case(word.as_bytes()))
        .map(|(_, command)| command.clone())
        .unwrap_or_else(|| Command::Unknown(String::from_utf8_lossy(text)))
}
