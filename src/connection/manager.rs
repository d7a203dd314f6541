//! Link manager with a persistent connection and automatic reconnection

use super::client::{ClientEvent, ReconnectPolicy};
use super::session::TextSender;
use crate::transport::{TransportConnector, TransportLink};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Timing and queue limits for the link task
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Bound on a single connect attempt
    pub connect_timeout: Duration,
    /// Bound on a single socket write
    pub send_timeout: Duration,
    /// Outbound messages waiting for the socket
    pub outbound_queue: usize,
    /// Events waiting for the client
    pub event_queue: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(5),
            outbound_queue: 16,
            event_queue: 100,
        }
    }
}

/// Text queued for the connection it was written for
#[derive(Debug)]
struct Outbound {
    generation: u64,
    text: String,
}

/// Non-blocking handle used by the client to queue outbound text
///
/// Each message is tagged with the generation of the last `Connected` the
/// client handled; the link task only writes messages for the current link.
#[derive(Debug, Clone)]
pub struct OutboundSender {
    tx: mpsc::Sender<Outbound>,
    generation: u64,
}

impl OutboundSender {
    fn new(tx: mpsc::Sender<Outbound>) -> Self {
        Self { tx, generation: 0 }
    }
}

impl TextSender for OutboundSender {
    fn send_text(&mut self, text: &str) -> Result<()> {
        let item = Outbound {
            generation: self.generation,
            text: text.to_owned(),
        };
        self.tx.try_send(item).map_err(|e| match e {
            TrySendError::Full(_) => anyhow!("Outbound queue full"),
            TrySendError::Closed(_) => anyhow!("Connection closed"),
        })
    }

    fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }
}

/// Owns the link task and the stream of events it produces
pub struct LinkManager {
    event_rx: mpsc::Receiver<ClientEvent>,
    task: JoinHandle<()>,
}

impl LinkManager {
    /// Spawn the connection loop, returning the manager and the outbound handle
    pub fn start<C>(connector: C, policy: ReconnectPolicy, config: LinkConfig) -> (Self, OutboundSender)
    where
        C: TransportConnector + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel::<Outbound>(config.outbound_queue.max(1));
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(config.event_queue.max(1));

        let task = tokio::spawn(async move {
            connection_loop(connector, policy, config, outbound_rx, event_tx).await;
        });

        (Self { event_rx, task }, OutboundSender::new(outbound_tx))
    }

    /// Receive the next link event
    pub async fn recv(&mut self) -> Option<ClientEvent> {
        self.event_rx.recv().await
    }

    /// Stop the link task
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Main connection loop with reconnection logic
async fn connection_loop<C: TransportConnector>(
    connector: C,
    policy: ReconnectPolicy,
    config: LinkConfig,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    // Generation 0 is never a live link, so text queued before the first
    // `Connected` is never written
    let mut generation = 0u64;

    loop {
        if event_tx.send(ClientEvent::ConnectInitiated).await.is_err() {
            break;
        }
        info!("Connecting via {}...", connector.name());

        let reason = match timeout(config.connect_timeout, connector.connect()).await {
            Ok(Ok(mut link)) => {
                generation += 1;
                if event_tx
                    .send(ClientEvent::Connected { generation })
                    .await
                    .is_err()
                {
                    let _ = link.shutdown().await;
                    break;
                }

                match handle_connection(&mut link, generation, &config, &mut outbound_rx, &event_tx)
                    .await
                {
                    Ok(()) => {
                        let _ = link.shutdown().await;
                        break;
                    }
                    Err(e) => e.to_string(),
                }
            }
            Ok(Err(e)) => format!("Connect failed: {:#}", e),
            Err(_) => format!("Connect timed out after {:?}", config.connect_timeout),
        };

        warn!("{}", reason);
        if event_tx
            .send(ClientEvent::Disconnected { reason })
            .await
            .is_err()
        {
            break;
        }

        // Wait before reconnecting
        tokio::time::sleep(policy.delay()).await;
    }

    debug!("Event receiver dropped, link task exiting");
}

/// Handle an active connection
///
/// Returns `Ok(())` only when the event receiver is gone; any link failure is
/// an `Err` carrying the disconnect reason.
async fn handle_connection<L: TransportLink>(
    link: &mut L,
    generation: u64,
    config: &LinkConfig,
    outbound_rx: &mut mpsc::Receiver<Outbound>,
    event_tx: &mpsc::Sender<ClientEvent>,
) -> Result<()> {
    loop {
        tokio::select! {
            // Send outbound messages
            Some(item) = outbound_rx.recv() => {
                if item.generation != generation {
                    debug!(
                        "Dropping text queued for connection {} on connection {}",
                        item.generation, generation
                    );
                    continue;
                }
                timeout(config.send_timeout, link.send_text(item.text))
                    .await
                    .map_err(|_| anyhow!("Send timed out after {:?}", config.send_timeout))??;
            }

            // Read incoming messages
            result = link.recv() => {
                match result {
                    Ok(Some(payload)) if payload.is_empty() => {}
                    Ok(Some(payload)) => {
                        if event_tx.send(ClientEvent::DataReceived(payload)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Ok(None) => return Err(anyhow!("Server closed connection")),
                    Err(e) => return Err(anyhow!("Read error: {}", e)),
                }
            }
        }
    }
}
