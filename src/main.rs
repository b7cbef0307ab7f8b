//! TGE Reward Console
//!
//! MCP server for the TGE reward contracts.

use rmcp::ServiceExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tge_reward_console::{Config, TgeConsoleServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting TGE Reward Console");

    let has_wallet = config.private_key.is_some();
    let server = TgeConsoleServer::new(config)?;
    if has_wallet {
        server.connect_configured_wallet().await;
    } else {
        tracing::info!("WALLET_PRIVATE_KEY not set, running read-only");
    }

    // Run with stdio transport
    let transport = rmcp::transport::stdio();
    let running = server.serve(transport).await?;

    running.waiting().await?;

    Ok(())
}
