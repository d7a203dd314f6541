//! Text protocol spoken over the relay WebSocket
//!
//! Every WebSocket text message carries exactly one of:
//! ```text
//! register:robot:<device_id>      robot -> relay, once per connection
//! cmd:<device_id>:<action>        controller -> relay
//! <action>                        relay -> robot (forwarded verbatim)
//! ```
//!
//! There is no escaping, so device identities may not contain `:`.

use thiserror::Error;

/// Prefix of a registration message
pub const REGISTER_PREFIX: &str = "register:";

/// Prefix of a controller command message
pub const COMMAND_PREFIX: &str = "cmd:";

/// Role announced by robot agents
pub const ROBOT_ROLE: &str = "robot";

/// Maximum device identity length in bytes
pub const MAX_DEVICE_ID_LEN: usize = 32;

/// Errors raised while building protocol values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Device id must not be empty")]
    EmptyDeviceId,

    #[error("Device id too long: {0} bytes (max: {MAX_DEVICE_ID_LEN})")]
    DeviceIdTooLong(usize),

    #[error("Device id contains invalid character {0:?}")]
    InvalidDeviceIdChar(char),
}

/// Identity token a robot announces on every connect
///
/// Fixed at startup and never changed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    /// Validate and wrap a device identity
    pub fn new(id: impl Into<String>) -> Result<Self, ProtocolError> {
        let id = id.into();

        if id.is_empty() {
            return Err(ProtocolError::EmptyDeviceId);
        }
        if id.len() > MAX_DEVICE_ID_LEN {
            return Err(ProtocolError::DeviceIdTooLong(id.len()));
        }
        if let Some(c) = id
            .chars()
            .find(|c| *c == ':' || c.is_whitespace() || c.is_control())
        {
            return Err(ProtocolError::InvalidDeviceIdChar(c));
        }

        Ok(Self(id))
    }

    /// Get the identity as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the registration text for a robot: `register:robot:<id>`
pub fn registration_message(identity: &DeviceIdentity) -> String {
    format!("{REGISTER_PREFIX}{ROBOT_ROLE}:{}", identity.as_str())
}

/// A message received by the relay, classified by prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage<'a> {
    /// A robot announcing itself
    Register { device_id: &'a str },
    /// A `register:` message with another role or no id
    MalformedRegistration,
    /// A controller asking the relay to forward `action` to `target`
    Command { target: &'a str, action: &'a str },
    /// Anything else
    Other(&'a str),
}

impl<'a> RelayMessage<'a> {
    /// Classify one inbound text message
    ///
    /// Only the third field of a registration is used as the id; for commands
    /// everything after the second colon is the action, colons included.
    pub fn parse(msg: &'a str) -> Self {
        if let Some(rest) = msg.strip_prefix(REGISTER_PREFIX) {
            let mut parts = rest.split(':');
            return match (parts.next(), parts.next()) {
                (Some(ROBOT_ROLE), Some(device_id)) if !device_id.is_empty() => {
                    RelayMessage::Register { device_id }
                }
                _ => RelayMessage::MalformedRegistration,
            };
        }

        if let Some(rest) = msg.strip_prefix(COMMAND_PREFIX) {
            let (target, action) = rest.split_once(':').unwrap_or((rest, ""));
            return RelayMessage::Command { target, action };
        }

        RelayMessage::Other(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_message_format() {
        let id = DeviceIdentity::new("robot1").unwrap();
        assert_eq!(registration_message(&id), "register:robot:robot1");
    }

    #[test]
    fn test_identity_validation() {
        assert_eq!(DeviceIdentity::new(""), Err(ProtocolError::EmptyDeviceId));
        assert_eq!(
            DeviceIdentity::new("robot:1"),
            Err(ProtocolError::InvalidDeviceIdChar(':'))
        );
        assert_eq!(
            DeviceIdentity::new("robot 1"),
            Err(ProtocolError::InvalidDeviceIdChar(' '))
        );
        assert!(matches!(
            DeviceIdentity::new("r".repeat(MAX_DEVICE_ID_LEN + 1)),
            Err(ProtocolError::DeviceIdTooLong(33))
        ));
        assert_eq!(DeviceIdentity::new("edge-7").unwrap().to_string(), "edge-7");
    }

    #[test]
    fn test_parse_registration() {
        assert_eq!(
            RelayMessage::parse("register:robot:robot1"),
            RelayMessage::Register { device_id: "robot1" }
        );
        // Extra fields after the id are ignored
        assert_eq!(
            RelayMessage::parse("register:robot:robot1:extra"),
            RelayMessage::Register { device_id: "robot1" }
        );
        assert_eq!(
            RelayMessage::parse("register:robot:"),
            RelayMessage::MalformedRegistration
        );
        assert_eq!(
            RelayMessage::parse("register:camera:cam1"),
            RelayMessage::MalformedRegistration
        );
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            RelayMessage::parse("cmd:robot1:FORWARD"),
            RelayMessage::Command {
                target: "robot1",
                action: "FORWARD"
            }
        );
        assert_eq!(
            RelayMessage::parse("cmd:robot1:say:hi"),
            RelayMessage::Command {
                target: "robot1",
                action: "say:hi"
            }
        );
        assert_eq!(
            RelayMessage::parse("cmd:robot1"),
            RelayMessage::Command {
                target: "robot1",
                action: ""
            }
        );
    }

    #[test]
    fn test_parse_other() {
        assert_eq!(RelayMessage::parse("hello"), RelayMessage::Other("hello"));
        assert_eq!(RelayMessage::parse(""), RelayMessage::Other(""));
    }
}
