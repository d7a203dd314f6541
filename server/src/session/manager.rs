//! Session manager for tracking registered robots

use super::connection::SessionHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maps robot device ids to their live connection
pub struct SessionManager {
    /// Map of device_id -> session handle
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a robot, returning the handle it replaced
    pub async fn register(&self, device_id: &str, handle: SessionHandle) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(device_id.to_string(), handle)
    }

    /// Unregister a robot if the entry still belongs to `session_id`
    pub async fn unregister(&self, device_id: &str, session_id: u64) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(device_id) {
            Some(handle) if handle.session_id == session_id => {
                sessions.remove(device_id);
                true
            }
            _ => false,
        }
    }

    /// Get a session handle for a specific robot
    pub async fn get(&self, device_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(device_id).cloned()
    }

    /// Send text to a specific robot
    pub async fn send_to(&self, device_id: &str, text: &str) -> anyhow::Result<()> {
        let handle = self
            .get(device_id)
            .await
            .filter(SessionHandle::is_open)
            .ok_or_else(|| anyhow::anyhow!("Robot not connected: {}", device_id))?;
        handle.send(text)
    }

    /// Get the number of registered robots
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
