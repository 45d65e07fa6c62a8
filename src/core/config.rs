//! Configuration Loading
//!
//! Server metadata and transport selection come from environment variables.
//! Tool and supervisor settings come from an optional YAML file (`kmcp.yaml`
//! by default, overridable with `KMCP_CONFIG`) organized hierarchically:
//!
//! ```yaml
//! tools:
//!   weather:
//!     default_forecast_days: 5
//! supervisor:
//!   log_dir: logs
//!   startup_grace_secs: 2
//!   servers:
//!     - name: math-server
//!       port: 3001
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::ConfigError;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kmcp.yaml";

/// Transport a server binary listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
    /// STDIO and HTTP concurrently
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

/// Runtime settings for a single MCP server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name reported in `initialize` responses
    pub name: String,
    /// Version reported in `initialize` responses
    pub version: String,
    pub transport: TransportMode,
    /// Bind address for HTTP mode
    pub host: String,
    /// Port for HTTP mode
    pub port: u16,
    /// HTTP worker count override
    pub workers: Option<usize>,
}

impl ServerConfig {
    /// Build the server configuration from environment variables.
    ///
    /// - SERVER_NAME (default: `default_name`)
    /// - SERVER_VERSION (default: crate version)
    /// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "stdio")
    /// - HOST (default: "127.0.0.1")
    /// - PORT (default: `default_port`, also used when unparseable)
    /// - WORKER_THREADS (default: CPU count, capped at 16)
    pub fn from_env(default_name: &str, default_port: u16) -> Result<Self, ConfigError> {
        Self::from_lookup(default_name, default_port, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(default_name: &str, default_port: u16, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = match lookup("MCP_TRANSPORT_MODE") {
            Some(mode) => mode.parse()?,
            None => TransportMode::Stdio,
        };

        Ok(Self {
            name: lookup("SERVER_NAME").unwrap_or_else(|| default_name.to_string()),
            version: lookup("SERVER_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            transport,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(default_port),
            workers: lookup("WORKER_THREADS").and_then(|w| w.parse::<usize>().ok()),
        })
    }
}

/// A server managed by the supervisor commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerEntry {
    /// Binary name, also the process-listing match pattern and log file stem
    pub name: String,
    /// HTTP port handed to the server through `PORT`
    pub port: u16,
    /// Explicit executable path; defaults to `<name>` next to the supervisor
    #[serde(default)]
    pub command: Option<PathBuf>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// `supervisor:` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupervisorSection {
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub startup_grace_secs: Option<u64>,
    #[serde(default)]
    pub servers: Option<Vec<ServerEntry>>,
}

/// Parsed contents of the YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KmcpConfig {
    /// Tool-specific settings keyed by tool group name
    #[serde(default)]
    pub tools: HashMap<String, HashMap<String, Value>>,
    #[serde(default)]
    pub supervisor: SupervisorSection,
}

impl KmcpConfig {
    /// Get tool-specific configuration, or an empty map if the tool has none.
    ///
    /// If the config file contains:
    /// ```yaml
    /// tools:
    ///   weather:
    ///     default_forecast_days: 5
    /// ```
    /// then `tool_config("weather")` returns `{"default_forecast_days": 5}`.
    pub fn tool_config(&self, tool_name: &str) -> HashMap<String, Value> {
        self.tools.get(tool_name).cloned().unwrap_or_default()
    }
}

/// Path of the config file: `KMCP_CONFIG` or `kmcp.yaml`.
pub fn config_path() -> PathBuf {
    std::env::var_os("KMCP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the config file from its default location.
pub fn load_config() -> Result<KmcpConfig, ConfigError> {
    load_config_from(&config_path())
}

/// Load configuration from a YAML file.
///
/// A missing file yields the default (empty) configuration; a file that
/// exists but cannot be read or parsed is an error.
pub fn load_config_from(path: &Path) -> Result<KmcpConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(KmcpConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(KmcpConfig::default());
    }

    serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
