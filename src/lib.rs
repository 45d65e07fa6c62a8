//! Math and mock weather MCP tool servers, plus the process supervisor that
//! starts, stops and checks them.

pub mod client;
pub mod core;
pub mod supervisor;
pub mod tools;
