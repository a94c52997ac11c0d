//! Serve command for starting the gateway.
//!
//! `supagate serve` - Run the HTTP tool-call endpoint until Ctrl+C.

use anyhow::{Context, Result};
use supagate_core::GatewayConfig;
use supagate_mcp::HttpServer;

pub async fn run(config: GatewayConfig) -> Result<()> {
    tracing::info!(
        environment = %config.environment,
        addr = %config.server.bind_addr(),
        "Starting Supagate"
    );

    let server = HttpServer::from_config(&config).context("Failed to initialize gateway")?;
    server.run().await.context("Gateway stopped with an error")?;

    Ok(())
}
