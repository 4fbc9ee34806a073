//! Tool trait definition
//!
//! Defines the core trait for tools the model can invoke by name.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::Result;

/// Tool execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Output string from tool execution
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }
}

/// A named capability an agent exposes to the model
///
/// Returning `Err` is allowed; the tool loop turns it into an error result
/// for the model rather than failing the turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name announced in the function declaration
    fn name(&self) -> &str;

    /// Description shown to the model when selecting tools
    fn description(&self) -> &str;

    /// JSON schema for the tool's arguments
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given arguments object
    async fn execute(&self, input: JsonValue) -> Result<ToolResult>;
}

/// Read a required string argument.
pub fn required_str<'a>(input: &'a JsonValue, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| crate::Error::ToolExecution(format!("Missing required argument '{}'", key)))
}
