use anyhow::{Context, Result};
use robot_agent::config::AgentConfig;
use robot_agent::connection::{ConnectionSession, LinkManager, ReconnectPolicy, ReconnectingClient};
use robot_agent::motion::LoggingMotion;
use robot_agent::transport::WsConnector;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AgentConfig::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let url = config.server_url()?;
    let identity = config.identity()?;

    info!("Robot agent starting: {}", identity);
    info!("  Relay: {}", url);
    info!("  Reconnect delay: {:?}", config.reconnect_delay);
    info!("  Receive buffer: {} bytes", config.receive_buffer_capacity);

    let policy = ReconnectPolicy::fixed(config.reconnect_delay);
    let (mut link, sender) = LinkManager::start(WsConnector::new(url), policy, config.link.clone());

    let mut client = ReconnectingClient::new(
        ConnectionSession::new(identity),
        LoggingMotion::new(),
        sender,
        policy,
        config.receive_buffer_capacity,
    );

    // Main event loop: the only place client state is touched
    loop {
        tokio::select! {
            event = link.recv() => match event {
                Some(event) => client.handle_event(event),
                None => {
                    error!("Link task ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    let stats = client.stats();
    info!(
        "Connects: {} registrations: {} commands: {} unknown: {}",
        stats.connects, stats.registrations_sent, stats.commands_dispatched, stats.unknown_commands
    );
    link.shutdown();

    Ok(())
}
