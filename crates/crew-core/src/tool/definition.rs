//! Tool schema helpers

use serde_json::{Map, Value as JsonValue, json};

pub use crate::llm::ToolDefinition;

/// Helper for building the JSON schemas tools announce
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Create an object schema from `(name, type, description, required)`
    /// tuples. Property order is kept.
    pub fn object_schema(properties: &[(&str, &str, &str, bool)]) -> JsonValue {
        let props: Map<String, JsonValue> = properties
            .iter()
            .map(|(name, type_str, desc, _)| {
                (
                    name.to_string(),
                    json!({"type": type_str, "description": desc}),
                )
            })
            .collect();

        let required: Vec<&str> = properties
            .iter()
            .filter(|(_, _, _, required)| *required)
            .map(|(name, _, _, _)| *name)
            .collect();

        json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }
}
