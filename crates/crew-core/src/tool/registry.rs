//! Name-keyed tool registry
//!
//! A registry is assembled once through [`ToolRegistryBuilder`] and is
//! read-only afterwards. Dispatch never fails: unknown names, tool errors and
//! tool panics all come back as error results for the model.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::llm::{ToolDefinition, ToolInvocationRequest, ToolInvocationResult};
use crate::tool::Tool;

/// Registered tools indexed by name, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// An empty registry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Definitions announced to the service
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Run one requested tool and convert every outcome into a result.
    pub async fn invoke(&self, request: &ToolInvocationRequest) -> ToolInvocationResult {
        let Some(tool) = self.get(&request.name) else {
            warn!(tool = %request.name, "Model requested an unknown tool");
            return ToolInvocationResult::error(
                &request.name,
                format!(
                    "Error: Tool '{}' not found. Available tools: [{}]",
                    request.name,
                    self.names().join(", ")
                ),
            );
        };

        debug!(tool = %request.name, args = ?request.args, "Executing tool");

        let input = JsonValue::Object(request.args.clone());
        let outcome = AssertUnwindSafe(tool.execute(input)).catch_unwind().await;

        match outcome {
            Ok(Ok(result)) => ToolInvocationResult {
                name: request.name.clone(),
                payload: result.output,
                is_error: result.is_error,
            },
            Ok(Err(e)) => {
                warn!(tool = %request.name, error = %e, "Tool returned an error");
                ToolInvocationResult::error(
                    &request.name,
                    format!("Error executing tool '{}': {}", request.name, e),
                )
            }
            Err(panic) => {
                let description = panic_message(panic.as_ref());
                warn!(tool = %request.name, panic = %description, "Tool panicked");
                ToolInvocationResult::error(
                    &request.name,
                    format!("Error executing tool '{}': {}", request.name, description),
                )
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Builder for [`ToolRegistry`]
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Add a tool. A later tool with the same name replaces the earlier one.
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    /// Add every tool of another registry.
    pub fn extend(mut self, other: &ToolRegistry) -> Self {
        for tool in &other.tools {
            self = self.tool(tool.clone());
        }
        self
    }

    pub fn build(self) -> ToolRegistry {
        let index = self
            .tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name().to_string(), i))
            .collect();

        ToolRegistry {
            tools: self.tools,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolResult;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use serde_json::{Map, json};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the text argument"
        }
        fn input_schema(&self) -> JsonValue {
            json!({"type": "object"})
        }
        async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
            Ok(ToolResult::success(input["text"].as_str().unwrap_or_default()))
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn input_schema(&self) -> JsonValue {
            json!({"type": "object"})
        }
        async fn execute(&self, _input: JsonValue) -> Result<ToolResult> {
            Err(Error::ToolExecution("disk on fire".to_string()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Tool for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }
        fn description(&self) -> &str {
            "Always panics"
        }
        fn input_schema(&self) -> JsonValue {
            json!({"type": "object"})
        }
        async fn execute(&self, _input: JsonValue) -> Result<ToolResult> {
            panic!("index out of bounds")
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::builder()
            .tool(Arc::new(Echo))
            .tool(Arc::new(Failing))
            .tool(Arc::new(Panicking))
            .build()
    }

    fn call(name: &str, args: JsonValue) -> ToolInvocationRequest {
        ToolInvocationRequest::from_value(name, args)
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let registry = registry();
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "failing", "panicking"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let registry = ToolRegistry::builder()
            .tool(Arc::new(Echo))
            .tool(Arc::new(Echo))
            .build();
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let result = registry().invoke(&call("echo", json!({"text": "hi"}))).await;
        assert_eq!(result, ToolInvocationResult::success("echo", "hi"));
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let result = registry().invoke(&call("teleport", json!({}))).await;
        assert!(result.is_error);
        assert_eq!(
            result.payload,
            "Error: Tool 'teleport' not found. Available tools: [echo, failing, panicking]"
        );
    }

    #[tokio::test]
    async fn test_invoke_error_is_converted() {
        let result = registry()
            .invoke(&ToolInvocationRequest::new("failing", Map::new()))
            .await;
        assert!(result.is_error);
        assert!(result.payload.starts_with("Error executing tool 'failing':"));
        assert!(result.payload.contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_invoke_panic_is_contained() {
        let result = registry().invoke(&call("panicking", json!({}))).await;
        assert!(result.is_error);
        assert!(result.payload.contains("index out of bounds"));
    }
}
