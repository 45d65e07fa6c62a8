//! Error Types
//!
//! Typed errors for tool execution and configuration loading. Tool errors are
//! reported to MCP clients as `isError: true` results rather than JSON-RPC
//! errors, so their messages are meant to be read by the calling agent.

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a tool handler.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran but could not produce a result
    #[error("{0}")]
    Execution(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

/// Failure while loading server or supervisor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid transport mode '{0}': must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),
}
