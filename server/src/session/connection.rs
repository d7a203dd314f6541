//! Individual WebSocket session handling

use crate::command::{CommandDispatcher, RouteOutcome};
use anyhow::{anyhow, Result};
use futures::{Sink, SinkExt, StreamExt};
use std::borrow::Cow;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// How long a closing session waits for queued text to reach the socket
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to send text to a specific connection
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session_id: u64,
    pub addr: SocketAddr,
    tx: mpsc::UnboundedSender<String>,
}

impl SessionHandle {
    pub fn new(session_id: u64, addr: SocketAddr, tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            session_id,
            addr,
            tx,
        }
    }

    /// Queue a text message for this connection
    pub fn send(&self, text: &str) -> Result<()> {
        self.tx
            .send(text.to_owned())
            .map_err(|_| anyhow!("Session {} closed", self.session_id))
    }

    /// Check if the connection's writer is still running
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Serve one accepted connection until it closes
pub async fn run_session(
    stream: TcpStream,
    addr: SocketAddr,
    session_id: u64,
    dispatcher: Arc<CommandDispatcher>,
) -> Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    info!("Client connected: {}", addr);

    let (writer, mut reader) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let handle = SessionHandle::new(session_id, addr, tx);

    let writer_task = tokio::spawn(write_queued(writer, rx, addr));

    // Robot identity for this connection, once registered
    let mut device_id: Option<String> = None;

    while let Some(msg) = reader.next().await {
        let text: Cow<'_, str> = match &msg {
            Ok(Message::Text(text)) => Cow::Borrowed(text.as_str()),
            Ok(Message::Binary(data)) => String::from_utf8_lossy(data),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("Read error from {}: {}", addr, e);
                break;
            }
        };

        if let RouteOutcome::Registered(id) = dispatcher.handle_text(&handle, &text).await {
            // A connection that re-registers under a new id gives up the old one
            if let Some(previous) = device_id.take().filter(|previous| *previous != id) {
                dispatcher.sessions().unregister(&previous, session_id).await;
            }
            device_id = Some(id);
        }
    }

    match device_id {
        Some(id) => {
            if dispatcher.sessions().unregister(&id, session_id).await {
                info!("Robot disconnected: {}", id);
            } else {
                info!("Robot disconnected: {} (already replaced)", id);
            }
        }
        None => info!("Client disconnected: {}", addr),
    }

    finish_writer(handle, writer_task).await;
    Ok(())
}

/// Write queued text to the socket until every handle is dropped
async fn write_queued<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>, addr: SocketAddr)
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    while let Some(text) = rx.recv().await {
        if let Err(e) = writer.send(Message::Text(text)).await {
            debug!("Write to {} failed: {}", addr, e);
            break;
        }
    }
}

/// Let the writer flush text that was already forwarded, then stop it
async fn finish_writer(handle: SessionHandle, mut writer_task: JoinHandle<()>) {
    let session_id = handle.session_id;
    drop(handle);

    if timeout(WRITER_DRAIN_TIMEOUT, &mut writer_task).await.is_err() {
        debug!("Session {} writer did not drain in time", session_id);
        writer_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_reports_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(1, "127.0.0.1:9000".parse().unwrap(), tx);

        handle.send("FORWARD").unwrap();
        assert!(handle.is_open());

        drop(rx);
        assert!(!handle.is_open());
        assert!(handle.send("STOP").is_err());
    }

    #[tokio::test]
    async fn test_forwarded_text_is_written_before_close() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let (sink, mut written) = futures::channel::mpsc::unbounded::<Message>();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(1, addr, tx);
        let writer_task = tokio::spawn(write_queued(sink, rx, addr));

        handle.send("FORWARD").unwrap();
        handle.send("STOP").unwrap();
        finish_writer(handle, writer_task).await;

        assert_eq!(written.next().await, Some(Message::Text("FORWARD".into())));
        assert_eq!(written.next().await, Some(Message::Text("STOP".into())));
        // The writer has exited and dropped its end
        assert_eq!(written.next().await, None);
    }
}
