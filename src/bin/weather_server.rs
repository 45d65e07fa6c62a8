//! Weather MCP server.
//!
//! Serves mock current conditions, forecasts, alerts and comparisons.
//! Transport and metadata are configured through environment variables
//! (see `ServerConfig::from_env`); tool settings come from `kmcp.yaml`.

use anyhow::Context;
use mcp_servers::core::config::{self, ServerConfig};
use mcp_servers::core::{logging, server};
use mcp_servers::tools;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let kmcp = config::load_config().context("failed to load configuration")?;
    let config = ServerConfig::from_env("weather-server", 3002)?;
    let registry = tools::weather_registry(&kmcp);

    info!(
        transport = ?config.transport,
        tools = ?registry.tool_names().collect::<Vec<_>>(),
        "Starting Weather MCP Server"
    );

    server::run(config, registry).await?;
    Ok(())
}
