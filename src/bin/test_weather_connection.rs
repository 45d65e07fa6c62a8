//! Smoke-test the weather server over STDIO: list its tools and fetch the
//! current weather for Tokyo.

use anyhow::Context;
use mcp_servers::client::StdioClient;
use mcp_servers::core::logging;
use serde_json::json;
use std::path::PathBuf;

fn weather_server_path() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate current executable")?;
    let dir = exe.parent().context("executable has no parent directory")?;
    Ok(dir.join("weather-server"))
}

async fn run(client: &mut StdioClient) -> anyhow::Result<()> {
    client.initialize().await?;
    let tools = client.list_tools().await?;

    println!("✅ Connection successful!");
    println!("📋 Available tools: {}", tools.len());
    for tool in &tools {
        println!("  • {}: {}", tool.name, tool.description);
    }

    let weather_tools = tools
        .iter()
        .filter(|tool| tool.name.to_lowercase().contains("weather"))
        .count();
    if weather_tools == 0 {
        println!("⚠️  No weather tools found!");
        return Ok(());
    }
    println!("\n🌤️  Found {} weather tools!", weather_tools);

    println!("\n🧪 Testing get_current_weather tool...");
    if !tools.iter().any(|tool| tool.name == "get_current_weather") {
        println!("❌ get_current_weather tool not found");
        return Ok(());
    }

    match client
        .call_tool("get_current_weather", json!({ "city": "Tokyo" }))
        .await
    {
        Ok(result) => {
            println!("📍 Weather result for Tokyo:");
            println!("{}", result.first_text().unwrap_or("No content"));
        }
        Err(e) => println!("❌ Error calling weather tool: {}", e),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("warn");

    println!("🧪 Testing Weather Server MCP Connection...");
    println!("{}", "=".repeat(50));

    let outcome = match StdioClient::spawn(&weather_server_path()?, &[]).await {
        Ok(mut client) => {
            let result = run(&mut client).await;
            let _ = client.shutdown().await;
            result
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = outcome {
        println!("❌ Connection failed: {}", e);
        println!("\n🔍 Troubleshooting:");
        println!("  1. Check if the weather-server binary exists next to this one");
        println!("  2. Check if the weather server starts: MCP_TRANSPORT_MODE=stdio weather-server");
        println!("  3. Check weather-server.log for startup errors");
    }
    Ok(())
}
