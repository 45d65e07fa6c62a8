//! MCP Server Implementation
//!
//! This module contains the MCP server shared by the math and weather binaries:
//! - JSON-RPC 2.0 request/response structures
//! - Tool registry mapping tool names to handlers
//! - `McpService`, the transport-independent request dispatcher
//! - HTTP server setup with Actix Web
//! - STDIO server implementation for line-based communication

use actix_web::{
    web, App, HttpServer, HttpResponse,
    middleware::{Compress, Logger, DefaultHeaders},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, warn};

use crate::core::config::{ServerConfig, TransportMode};
use crate::core::error::ToolError;

/// MCP protocol revision announced in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Server metadata reported in MCP initialize responses.
#[derive(Clone, Debug)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None for notifications, which never receive a response. An
/// explicit `"id": null` is kept as `Some(Value::Null)` and answered.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    #[allow(dead_code)]
    #[serde(default)]
    jsonrpc: String,
    #[serde(default, deserialize_with = "present_id")]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response structure for MCP protocol.
///
/// Exactly one of `result` or `error` is present.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

impl MCPResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(MCPError {
                code,
                message,
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct MCPError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// MCP tool definition, as listed by `tools/list`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MCPTool {
    /// Unique tool identifier (e.g., "add", "get_current_weather")
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Tool handler function type definition.
///
/// Handlers take the JSON `arguments` object and return a JSON value. A
/// string result is sent to the client verbatim; anything else is sent as
/// its JSON text. Handlers must be Send + Sync to be shared by HTTP workers.
pub type ToolHandler = Box<dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync>;

/// Registry of available MCP tools.
///
/// Keeps the tool definitions in registration order for `tools/list` and
/// the handlers keyed by name for `tools/call`.
#[derive(Default)]
pub struct ToolRegistry {
    pub tools: Vec<MCPTool>,
    pub handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with the registry, replacing any tool of the same name.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        self.tools.retain(|t| t.name != name);
        self.tools.push(tool);
        self.handlers.insert(name, handler);
    }

    /// Run a tool by name. Returns None when no such tool is registered.
    pub fn call(&self, name: &str, arguments: Value) -> Option<Result<Value, ToolError>> {
        self.handlers.get(name).map(|handler| handler(arguments))
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }
}

/// Transport-independent MCP request dispatcher.
///
/// Both the HTTP and STDIO transports hand parsed requests to the same
/// service, so every method behaves identically on either transport.
pub struct McpService {
    info: ServerInfo,
    registry: ToolRegistry,
}

impl McpService {
    pub fn new(info: ServerInfo, registry: ToolRegistry) -> Self {
        Self { info, registry }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Route a request to its method handler.
    ///
    /// Returns None for notifications (requests without an id).
    pub fn handle(&self, req: MCPRequest) -> Option<MCPResponse> {
        let Some(id) = req.id else {
            debug!(method = %req.method, "Notification received");
            return None;
        };

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => MCPResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, req.params),
            other => MCPResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    /// Parse and handle one line of the STDIO stream.
    ///
    /// Unparseable input gets a parse error only when an id can be recovered
    /// from it; otherwise it is dropped.
    pub fn handle_line(&self, line: &str) -> Option<MCPResponse> {
        match serde_json::from_str::<MCPRequest>(line) {
            Ok(req) => self.handle(req),
            Err(e) => {
                warn!(error = %e, "Parse error");
                let partial = serde_json::from_str::<Value>(line).ok()?;
                let id = partial.get("id")?.clone();
                Some(MCPResponse::failure(
                    id,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    fn handle_initialize(&self, id: Value) -> MCPResponse {
        MCPResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": self.info.name,
                    "version": self.info.version
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Value) -> MCPResponse {
        MCPResponse::success(id, json!({ "tools": self.registry.tools }))
    }

    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> MCPResponse {
        let Some(params) = params else {
            return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params".to_string());
        };

        let tool_name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        match self.registry.call(tool_name, arguments) {
            Some(Ok(result)) => {
                debug!(tool = tool_name, "Tool call succeeded");
                MCPResponse::success(id, tool_result(result_text(result), false))
            }
            Some(Err(e)) => {
                warn!(tool = tool_name, error = %e, "Tool call failed");
                MCPResponse::success(id, tool_result(format!("Error: {}", e), true))
            }
            None => MCPResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown tool: {}", tool_name),
            ),
        }
    }
}

fn result_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn tool_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "isError": is_error
    })
}

/// Health check endpoint handler.
async fn health(service: web::Data<McpService>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": service.info().name
    }))
}

/// MCP JSON-RPC request handler.
///
/// Counts every request for the metrics endpoint. Notifications are
/// acknowledged with 202 and no body.
async fn mcp_handler(
    service: web::Data<McpService>,
    counter: web::Data<AtomicU64>,
    req: web::Json<MCPRequest>,
) -> HttpResponse {
    counter.fetch_add(1, Ordering::Relaxed);

    match service.handle(req.into_inner()) {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::Accepted().finish(),
    }
}

/// Total number of MCP requests processed since server start.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> HttpResponse {
    let count = counter.load(Ordering::Relaxed);
    HttpResponse::Ok().json(json!({
        "requests_total": count,
        "status": "ok"
    }))
}

/// Run the MCP server in HTTP mode.
///
/// Worker threads default to the CPU count, capped at 16.
pub async fn run_server_http(
    service: Arc<McpService>,
    host: &str,
    port: u16,
    workers: Option<usize>,
) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = format!("{}:{}", host, port);
    let workers = workers.unwrap_or_else(|| num_cpus::get().clamp(1, 16));

    info!(
        name = %service.info().name,
        version = %service.info().version,
        bind = %bind_addr,
        workers,
        "MCP server starting (HTTP mode)"
    );

    let service = web::Data::from(service);
    let request_count = web::Data::new(AtomicU64::new(0));

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(request_count.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/mcp", web::post().to(mcp_handler))
            .route("/", web::post().to(mcp_handler))
            .route("/", web::get().to(health))
    })
    .workers(workers)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Serve line-delimited JSON-RPC from `reader`, writing responses to `writer`.
///
/// Requests are processed one at a time. Each response is written on its
/// own line and flushed immediately. Returns when the reader hits EOF.
pub async fn serve_lines<R, W>(service: &McpService, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(response) = service.handle_line(&line) else {
            continue;
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Error serializing response");
                continue;
            }
        };

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Run the MCP server in STDIO mode until stdin closes.
pub async fn run_server_stdio(service: Arc<McpService>) -> std::io::Result<()> {
    info!(
        name = %service.info().name,
        version = %service.info().version,
        "MCP server starting (STDIO mode)"
    );

    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(&service, stdin, stdout).await?;

    info!("STDIO closed, shutting down");
    Ok(())
}

/// Start the server on the transport selected by `config`.
///
/// In "both" mode STDIO runs in a background task and is aborted once the
/// HTTP server exits.
pub async fn run(config: ServerConfig, registry: ToolRegistry) -> std::io::Result<()> {
    let service = Arc::new(McpService::new(
        ServerInfo {
            name: config.name.clone(),
            version: config.version.clone(),
        },
        registry,
    ));

    match config.transport {
        TransportMode::Stdio => run_server_stdio(service).await,
        TransportMode::Http => {
            run_server_http(service, &config.host, config.port, config.workers).await
        }
        TransportMode::Both => {
            let stdio_service = service.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = run_server_stdio(stdio_service).await {
                    error!(error = %e, "STDIO server error");
                }
            });

            let http_result =
                run_server_http(service, &config.host, config.port, config.workers).await;
            stdio_handle.abort();
            http_result
        }
    }
}
