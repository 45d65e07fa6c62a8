//! Drive the real server binaries over STDIO.

use mcp_servers::client::{ClientError, StdioClient};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

async fn connect(bin: &str) -> StdioClient {
    let mut client = StdioClient::spawn(Path::new(bin), &[])
        .await
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    let info = client.initialize().await.unwrap();
    assert_eq!(info["protocolVersion"], "2024-11-05");
    client
}

#[tokio::test]
async fn weather_server_lists_and_runs_tools() {
    let mut client = connect(env!("CARGO_BIN_EXE_weather-server")).await;

    let names: Vec<String> = client
        .list_tools()
        .await
        .unwrap()
        .into_iter()
        .map(|tool| tool.name)
        .collect();
    assert_eq!(
        names,
        vec!["get_current_weather", "get_weather_forecast", "get_weather_alerts", "compare_weather"]
    );

    let result = client
        .call_tool("get_current_weather", json!({ "city": "Tokyo" }))
        .await
        .unwrap();
    assert!(!result.is_error);
    let text = result.first_text().unwrap();
    assert!(text.starts_with("🌤️ Current Weather in Tokyo:"));
    assert!(text.contains("Temperature: 22°C"));

    let result = client
        .call_tool("get_weather_forecast", json!({ "city": "denver", "days": 10 }))
        .await
        .unwrap();
    assert_eq!(result.first_text().unwrap().matches("📆 ").count(), 7);

    let result = client
        .call_tool("get_weather_alerts", json!({ "city": "phoenix" }))
        .await
        .unwrap();
    assert!(result.first_text().unwrap().contains("1. 🔥 Excessive Heat Warning"));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn weather_server_reports_bad_calls() {
    let mut client = connect(env!("CARGO_BIN_EXE_weather-server")).await;

    let result = client
        .call_tool("compare_weather", json!({ "city1": "Tokyo" }))
        .await
        .unwrap();
    assert!(result.is_error);

    let err = client.call_tool("get_stock_price", json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Rpc { code: -32601, .. }));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn math_server_divides_and_rejects_zero() {
    let mut client = connect(env!("CARGO_BIN_EXE_math-server")).await;

    let result = client.call_tool("divide", json!({ "a": 9, "b": 4 })).await.unwrap();
    assert_eq!(result.first_text(), Some("2.25"));

    let result = client.call_tool("divide", json!({ "a": 9, "b": 0 })).await.unwrap();
    assert!(result.is_error);
    assert_eq!(result.first_text(), Some("Error: Division by zero"));

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn spawning_a_missing_binary_fails_cleanly() {
    let err = StdioClient::spawn(Path::new("/nonexistent/weather-server"), &[])
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::Spawn { .. }));
}
