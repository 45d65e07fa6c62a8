//! Report which MCP servers are running and what their logs say.

use anyhow::Context;
use mcp_servers::core::{config, logging};
use mcp_servers::supervisor::report::StatusReport;
use mcp_servers::supervisor::{discovery, SupervisorConfig};

fn main() -> anyhow::Result<()> {
    logging::init("warn");

    let kmcp = config::load_config().context("failed to load configuration")?;
    let config = SupervisorConfig::from_config(&kmcp)?;

    let report = StatusReport::gather(&config, discovery::find_pids);
    println!("{report}");
    Ok(())
}
