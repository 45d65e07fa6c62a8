//! Minimal MCP client over a child process's stdio.
//!
//! Enough of the protocol to smoke-test a server binary: the initialize
//! handshake, `tools/list` and `tools/call`. Requests are sent one at a
//! time; lines that are not the awaited response are skipped.

use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::core::server::{MCPTool, PROTOCOL_VERSION};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to start server {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON from server: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server closed the connection")]
    Closed,

    #[error("no response to {0} within the timeout")]
    Timeout(String),

    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// One content block of a tool result.
#[derive(Deserialize, Debug, Clone)]
pub struct Content {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Result of `tools/call`.
#[derive(Deserialize, Debug, Clone)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Text of the first `text` content block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.kind == "text")
            .and_then(|c| c.text.as_deref())
    }
}

#[derive(Deserialize)]
struct ToolList {
    tools: Vec<MCPTool>,
}

pub struct StdioClient {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    timeout: Duration,
}

impl StdioClient {
    /// Spawn `program` in STDIO mode and connect to it. The server's stderr
    /// is discarded.
    pub async fn spawn(program: &Path, args: &[String]) -> Result<Self, ClientError> {
        let mut child = Command::new(program)
            .args(args)
            .env("MCP_TRANSPORT_MODE", "stdio")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClientError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(ClientError::Closed)?;
        let stdout = child.stdout.take().ok_or(ClientError::Closed)?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Perform the initialize handshake and return the server's result.
    pub async fn initialize(&mut self) -> Result<Value, ClientError> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "mcp-servers-client",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await?;
        self.notify("notifications/initialized").await?;
        Ok(result)
    }

    pub async fn list_tools(&mut self) -> Result<Vec<MCPTool>, ClientError> {
        let result = self.request("tools/list", json!({})).await?;
        let list: ToolList = serde_json::from_value(result)?;
        Ok(list.tools)
    }

    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<CallToolResult, ClientError> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Close the server's stdin and wait for it to exit, killing it if it
    /// outlives the timeout.
    pub async fn shutdown(self) -> Result<(), ClientError> {
        let Self {
            mut child,
            stdin,
            timeout,
            ..
        } = self;
        drop(stdin);

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(%status, "Server exited");
            }
            Err(_) => {
                child.kill().await?;
            }
        }
        Ok(())
    }

    async fn send(&mut self, message: &Value) -> Result<(), ClientError> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn notify(&mut self, method: &str) -> Result<(), ClientError> {
        self.send(&json!({ "jsonrpc": "2.0", "method": method })).await
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id;
        self.next_id += 1;

        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }))
        .await?;

        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.read_response(id))
            .await
            .map_err(|_| ClientError::Timeout(method.to_string()))?
    }

    async fn read_response(&mut self, id: u64) -> Result<Value, ClientError> {
        loop {
            let Some(line) = self.stdout.next_line().await? else {
                return Err(ClientError::Closed);
            };

            let Ok(message) = serde_json::from_str::<Value>(&line) else {
                debug!(line = %line, "Skipping non-JSON output");
                continue;
            };
            if message.get("id").and_then(Value::as_u64) != Some(id) {
                continue;
            }

            if let Some(error) = message.get("error") {
                return Err(ClientError::Rpc {
                    code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                });
            }
            return Ok(message.get("result").cloned().unwrap_or(Value::Null));
        }
    }
}
