//! Command dispatcher for forwarding controller commands to robots

use crate::session::{SessionHandle, SessionManager};
use robot_shared::RelayMessage;
use std::sync::Arc;
use tracing::{info, warn};

/// What the relay did with one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The sender is now known as this robot
    Registered(String),
    /// The action was queued for the target robot
    Forwarded,
    /// No live robot with that id
    NotConnected,
    /// A malformed registration, dropped
    Ignored,
    /// Not part of the protocol, logged only
    Unhandled,
}

/// Routes inbound relay messages
pub struct CommandDispatcher {
    session_manager: Arc<SessionManager>,
}

impl CommandDispatcher {
    /// Create a new command dispatcher
    pub fn new(session_manager: Arc<SessionManager>) -> Self {
        Self { session_manager }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.session_manager
    }

    /// Handle one text message received from `origin`
    pub async fn handle_text(&self, origin: &SessionHandle, text: &str) -> RouteOutcome {
        info!("<< {}", text);

        match RelayMessage::parse(text) {
            RelayMessage::Register { device_id } => {
                if let Some(previous) = self
                    .session_manager
                    .register(device_id, origin.clone())
                    .await
                {
                    if previous.session_id != origin.session_id {
                        info!("Robot {} re-registered from {}", device_id, origin.addr);
                    }
                }
                info!(
                    "Robot registered: {} ({} online)",
                    device_id,
                    self.session_manager.count().await
                );
                RouteOutcome::Registered(device_id.to_string())
            }
            RelayMessage::MalformedRegistration => RouteOutcome::Ignored,
            RelayMessage::Command { target, action } => {
                match self.session_manager.send_to(target, action).await {
                    Ok(()) => {
                        info!("-> forwarded to {}: {}", target, action);
                        RouteOutcome::Forwarded
                    }
                    Err(_) => {
                        warn!("Robot {} not connected", target);
                        RouteOutcome::NotConnected
                    }
                }
            }
            RelayMessage::Other(msg) => {
                info!("Unhandled message: {}", msg);
                RouteOutcome::Unhandled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(session_id: u64) -> (SessionHandle, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = "127.0.0.1:9000".parse().unwrap();
        (SessionHandle::new(session_id, addr, tx), rx)
    }

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(Arc::new(SessionManager::new()))
    }

    #[tokio::test]
    async fn test_register_then_forward() {
        let dispatcher = dispatcher();
        let (robot, mut robot_rx) = handle(1);
        let (controller, mut controller_rx) = handle(2);

        assert_eq!(
            dispatcher.handle_text(&robot, "register:robot:robot1").await,
            RouteOutcome::Registered("robot1".into())
        );
        assert_eq!(
            dispatcher.handle_text(&controller, "cmd:robot1:FORWARD").await,
            RouteOutcome::Forwarded
        );

        assert_eq!(robot_rx.recv().await.as_deref(), Some("FORWARD"));
        assert!(controller_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_action_keeps_colons() {
        let dispatcher = dispatcher();
        let (robot, mut robot_rx) = handle(1);

        dispatcher.handle_text(&robot, "register:robot:robot1").await;
        dispatcher.handle_text(&robot, "cmd:robot1:a:b").await;

        assert_eq!(robot_rx.recv().await.as_deref(), Some("a:b"));
    }

    #[tokio::test]
    async fn test_command_for_missing_robot() {
        let dispatcher = dispatcher();
        let (controller, _rx) = handle(2);

        assert_eq!(
            dispatcher.handle_text(&controller, "cmd:robot9:STOP").await,
            RouteOutcome::NotConnected
        );
    }

    #[tokio::test]
    async fn test_malformed_and_unhandled() {
        let dispatcher = dispatcher();
        let (client, _rx) = handle(1);

        assert_eq!(
            dispatcher.handle_text(&client, "register:camera:cam1").await,
            RouteOutcome::Ignored
        );
        assert_eq!(
            dispatcher.handle_text(&client, "hello").await,
            RouteOutcome::Unhandled
        );
        assert_eq!(dispatcher.sessions().count().await, 0);
    }
}
