//! Core Server Framework Module
//!
//! This module contains the pieces shared by every server binary:
//! - server.rs: MCP server implementation with HTTP and STDIO transport
//! - config.rs: Environment and YAML configuration
//! - error.rs: Tool and configuration error types
//! - logging.rs: tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;
pub mod server;
