//! Start every configured MCP server in the background.
//!
//! Exits 1 when no server could be started. Ctrl-C during startup stops
//! the servers launched so far.

use anyhow::Context;
use mcp_servers::core::{config, logging};
use mcp_servers::supervisor::launch::{LaunchOutcome, Launcher};
use mcp_servers::supervisor::report::{display_log_path, StartSummary};
use mcp_servers::supervisor::SupervisorConfig;
use std::process::ExitCode;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init("warn");

    let kmcp = config::load_config().context("failed to load configuration")?;
    let launcher = Launcher::new(SupervisorConfig::from_config(&kmcp)?);

    println!("🌟 Starting MCP Servers");
    println!("{}", "=".repeat(50));

    tokio::select! {
        _ = launch_all(&launcher) => {}
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Interrupted by user");
            for (launched, result) in launcher.terminate_started() {
                println!("Stopping {}...", launched.server.display_name());
                if let Err(e) = result {
                    warn!(server = %launched.server.name, error = %e, "Failed to stop server");
                }
            }
            return Ok(ExitCode::SUCCESS);
        }
    }

    let summary = StartSummary::new(launcher.config(), launcher.started());
    println!("{summary}");

    if summary.any_started() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn launch_all(launcher: &Launcher) {
    let config = launcher.config();

    for server in &config.servers {
        if !launcher.is_installed(server) {
            println!("⚠️  {} not found, skipping...", server.name);
            continue;
        }

        let name = server.display_name();
        println!("🚀 Starting {}...", name);
        println!("📝 Logs will be written to: {}", display_log_path(server, &config.log_dir));

        match launcher.launch(server).await {
            Ok(LaunchOutcome::Started { pid }) => {
                println!("✅ {} started successfully (PID: {})", name, pid);
            }
            Ok(LaunchOutcome::Missing) => {
                println!("⚠️  {} not found, skipping...", server.name);
            }
            Ok(LaunchOutcome::Exited) => println!("❌ {} failed to start", name),
            Err(e) => {
                warn!(server = %server.name, error = %e, "Launch failed");
                println!("❌ {} failed to start", name);
            }
        }
    }
}
