//! Math MCP server: add, subtract, multiply and divide.

use mcp_servers::core::config::ServerConfig;
use mcp_servers::core::{logging, server};
use mcp_servers::tools;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let config = ServerConfig::from_env("math-server", 3001)?;
    let registry = tools::math_registry();

    info!(transport = ?config.transport, "Starting Math MCP Server");
    server::run(config, registry).await?;
    Ok(())
}
