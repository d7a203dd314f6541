//! WebSocket transport implementation

use crate::transport::traits::{TransportConnector, TransportLink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

/// WebSocket stream wrapper implementing TransportLink
pub struct WsLink {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsLink {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self { inner: stream }
    }
}

#[async_trait]
impl TransportLink for WsLink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.inner.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(Bytes::from(text))),
                Some(Ok(Message::Binary(data))) => return Ok(Some(Bytes::from(data))),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Close frame received: {:?}", frame);
                    return Ok(None);
                }
                // Ping/pong replies are handled inside tungstenite
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.inner.close(None).await?;
        Ok(())
    }
}

/// WebSocket connector for a relay URI
pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TransportConnector for WsConnector {
    type Link = WsLink;

    async fn connect(&self) -> Result<Self::Link> {
        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("failed to connect websocket: {}", self.url))?;
        Ok(WsLink::new(stream))
    }

    fn name(&self) -> &'static str {
        "WebSocket"
    }
}
