mod command;
mod config;
mod session;

use anyhow::{Context, Result};
use command::CommandDispatcher;
use config::RelayConfig;
use session::SessionManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = RelayConfig::from_env();
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("WS relay running at ws://{}", addr);

    let dispatcher = Arc::new(CommandDispatcher::new(Arc::new(SessionManager::new())));
    serve(listener, dispatcher).await
}

/// Accept connections forever, one task per connection
async fn serve(listener: TcpListener, dispatcher: Arc<CommandDispatcher>) -> Result<()> {
    let next_session = AtomicU64::new(1);

    loop {
        let (stream, addr) = listener.accept().await?;
        let session_id = next_session.fetch_add(1, Ordering::Relaxed);
        let dispatcher = dispatcher.clone();

        tokio::spawn(async move {
            if let Err(e) = session::run_session(stream, addr, session_id, dispatcher).await {
                warn!("Session {} from {} failed: {:#}", session_id, addr, e);
            }
        });
    }
}
