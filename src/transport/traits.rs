//! Transport trait abstraction for pluggable link backends

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// A message-oriented link to the relay
#[async_trait]
pub trait TransportLink: Send + 'static {
    /// Send one text message
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Wait for the next inbound message
    ///
    /// Returns `Ok(None)` once the peer has closed the link. Must be cancel safe.
    async fn recv(&mut self) -> Result<Option<Bytes>>;

    /// Close the link gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for creating links
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// The link type this connector produces
    type Link: TransportLink;

    /// Attempt to connect, returning a link on success
    async fn connect(&self) -> Result<Self::Link>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
