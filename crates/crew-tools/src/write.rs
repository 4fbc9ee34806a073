//! Write tool for saving files under the project root

use async_trait::async_trait;
use crew_core::tool::{SchemaBuilder, required_str};
use crew_core::{Result, Tool, ToolResult};
use serde_json::Value;
use tokio::fs;

use crate::scope::ScopedRoot;

pub const SECURITY_VIOLATION: &str = "Error: Security violation. Cannot write outside project root.";

/// Creates or overwrites a file inside the scoped root
pub struct WriteFileTool {
    scope: ScopedRoot,
    name: &'static str,
    description: &'static str,
}

impl WriteFileTool {
    /// General-purpose `write_file`
    pub fn new(scope: ScopedRoot) -> Self {
        Self {
            scope,
            name: "write_file",
            description: "Write content to a file relative to the project root. \
                          Creates parent directories and overwrites existing files.",
        }
    }

    /// `write_design_doc`, for design documents such as `docs/architecture/system_design.md`
    pub fn design_doc(scope: ScopedRoot) -> Self {
        Self {
            scope,
            name: "write_design_doc",
            description: "Save a design document (Markdown etc.) at a path relative to the project root, \
                          e.g. 'docs/architecture/system_design.md'.",
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[
            ("file_path", "string", "Path relative to the project root", true),
            ("content", "string", "The content to write to the file", true),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let file_path = required_str(&input, "file_path")?;
        let content = required_str(&input, "content")?;

        let Some(target) = self.scope.resolve(file_path) else {
            tracing::warn!(tool = self.name, path = %file_path, "Rejected write outside project root");
            return Ok(ToolResult::error(SECURITY_VIOLATION));
        };

        tracing::debug!(path = %target.display(), content_len = content.len(), "Writing file");

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                return Ok(ToolResult::error(format!(
                    "Error saving file: failed to create parent directories: {}",
                    e
                )));
            }
        }

        match fs::write(&target, content).await {
            Ok(()) => Ok(ToolResult::success(format!(
                "Successfully saved {} ({} bytes).",
                file_path,
                content.len()
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error saving file: {}", e))),
        }
    }
}
