//! Send SIGTERM to every running MCP server process.

use anyhow::Context;
use mcp_servers::core::{config, logging};
use mcp_servers::supervisor::report::StopReport;
use mcp_servers::supervisor::{discovery, signal, SupervisorConfig};

fn main() -> anyhow::Result<()> {
    logging::init("warn");

    let kmcp = config::load_config().context("failed to load configuration")?;
    let config = SupervisorConfig::from_config(&kmcp)?;

    let report = StopReport::stop_all(&config, discovery::find_pids, signal::terminate);
    println!("{report}");
    Ok(())
}
