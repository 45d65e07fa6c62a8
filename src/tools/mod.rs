//! Tools Module
//!
//! Each tool group is a module exporting a `register` function that adds its
//! tools to a registry. The builders below assemble the registry served by
//! each binary.

pub mod math;
pub mod weather;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::config::KmcpConfig;
use crate::core::error::ToolError;
use crate::core::server::ToolRegistry;

/// Registry served by `math-server`.
pub fn math_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    math::register(&mut registry);
    registry
}

/// Registry served by `weather-server`, honoring `tools.weather` settings.
pub fn weather_registry(config: &KmcpConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    weather::register(&mut registry, &config.tool_config("weather"));
    registry
}

/// Deserialize a tool's `arguments` object into its typed argument struct.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    Ok(serde_json::from_value(args)?)
}
