//! Per-connection registration handshake

use anyhow::Result;
use robot_shared::{registration_message, DeviceIdentity};

/// Outbound text path to the relay
///
/// Implementations must not block the caller indefinitely.
pub trait TextSender {
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Text sent from now on belongs to connection `generation`
    fn set_generation(&mut self, _generation: u64) {}
}

/// Announces the device identity once per successful connect
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    identity: DeviceIdentity,
    registration: String,
}

impl ConnectionSession {
    pub fn new(identity: DeviceIdentity) -> Self {
        let registration = registration_message(&identity);
        Self {
            identity,
            registration,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// The exact text sent on connect
    pub fn registration(&self) -> &str {
        &self.registration
    }

    /// Send the registration message exactly once. No retry here; a failure
    /// is returned to the caller.
    pub fn on_connected<S: TextSender + ?Sized>(&self, sender: &mut S) -> Result<()> {
        sender.send_text(&self.registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<String>,
        fail: bool,
    }

    impl TextSender for Recorder {
        fn send_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(anyhow!("link down"));
            }
            self.sent.push(text.to_string());
            Ok(())
        }
    }

    fn session() -> ConnectionSession {
        ConnectionSession::new(DeviceIdentity::new("robot1").unwrap())
    }

    #[test]
    fn test_sends_registration_once() {
        let mut recorder = Recorder::default();
        session().on_connected(&mut recorder).unwrap();
        assert_eq!(recorder.sent, vec!["register:robot:robot1".to_string()]);
    }

    #[test]
    fn test_send_failure_is_returned() {
        let mut recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        assert!(session().on_connected(&mut recorder).is_err());
        assert!(recorder.sent.is_empty());
    }

    #[test]
    fn test_accessors() {
        let s = session();
        assert_eq!(s.identity().as_str(), "robot1");
        assert_eq!(s.registration(), "register:robot:robot1");
    }
}
