//! Math Tool Implementations
//!
//! Basic two-operand arithmetic. Results are returned as text; whole numbers
//! are rendered without a fractional part so `add(2, 3)` yields "5".

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolRegistry};
use crate::tools::parse_args;

#[derive(Deserialize)]
struct Operands {
    a: f64,
    b: f64,
}

/// Render a result, dropping the fraction for whole numbers.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn divide(a: f64, b: f64) -> Result<f64, ToolError> {
    if b == 0.0 {
        return Err(ToolError::Execution("Division by zero".to_string()));
    }
    Ok(a / b)
}

fn operands_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "number", "description": "First operand" },
            "b": { "type": "number", "description": "Second operand" }
        },
        "required": ["a", "b"]
    })
}

fn binary_op(op: fn(f64, f64) -> Result<f64, ToolError>) -> ToolHandler {
    Box::new(move |args: Value| -> Result<Value, ToolError> {
        let Operands { a, b } = parse_args(args)?;
        let result = op(a, b)?;
        Ok(Value::String(format_number(result)))
    })
}

/// Register the math tools with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let ops: [(&str, &str, fn(f64, f64) -> Result<f64, ToolError>); 4] = [
        ("add", "Add two numbers.", |a, b| Ok(a + b)),
        ("subtract", "Subtract b from a.", |a, b| Ok(a - b)),
        ("multiply", "Multiply two numbers.", |a, b| Ok(a * b)),
        ("divide", "Divide a by b.", divide),
    ];

    for (name, description, op) in ops {
        registry.register(
            MCPTool {
                name: name.to_string(),
                description: description.to_string(),
                input_schema: operands_schema(),
            },
            binary_op(op),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(registry: &ToolRegistry, tool: &str, args: Value) -> Result<Value, ToolError> {
        registry.call(tool, args).expect("tool should be registered")
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn arithmetic_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);

        assert_eq!(call(&registry, "add", json!({"a": 2, "b": 3})).unwrap(), json!("5"));
        assert_eq!(call(&registry, "subtract", json!({"a": 2, "b": 3})).unwrap(), json!("-1"));
        assert_eq!(call(&registry, "multiply", json!({"a": 4, "b": 2.5})).unwrap(), json!("10"));
        assert_eq!(call(&registry, "divide", json!({"a": 7, "b": 2})).unwrap(), json!("3.5"));
    }

    #[test]
    fn divide_by_zero_is_a_tool_error() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);

        let err = call(&registry, "divide", json!({"a": 1, "b": 0})).unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
        assert_eq!(err.to_string(), "Division by zero");
    }

    #[test]
    fn non_numeric_operands_are_rejected() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);

        let err = call(&registry, "add", json!({"a": "two", "b": 3})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
