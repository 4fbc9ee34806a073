//! Directory tree listing under the project root

use async_trait::async_trait;
use crew_core::tool::SchemaBuilder;
use crew_core::{Result, Tool, ToolResult};
use serde_json::Value;
use walkdir::{DirEntry, WalkDir};

use crate::scope::ScopedRoot;

const DEFAULT_MAX_DEPTH: usize = 2;
const DEPTH_CAP: usize = 8;

/// Lists files below a directory as an indented tree
pub struct ListFilesTool {
    scope: ScopedRoot,
}

impl ListFilesTool {
    pub fn new(scope: ScopedRoot) -> Self {
        Self { scope }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_project_files"
    }

    fn description(&self) -> &str {
        "Show the file structure below a directory of the project (hidden files are skipped)."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[
            ("directory", "string", "Directory relative to the project root (default '.')", false),
            ("max_depth", "integer", "How many levels to descend (default 2)", false),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let directory = input
            .get("directory")
            .and_then(Value::as_str)
            .unwrap_or(".");
        let max_depth = input
            .get("max_depth")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_MAX_DEPTH, |d| (d as usize).min(DEPTH_CAP));

        let Some(target) = self.scope.resolve(directory) else {
            return Ok(ToolResult::error(
                "Error: Security violation. Cannot access outside project root.",
            ));
        };

        if !target.is_dir() {
            return Ok(ToolResult::error(format!(
                "Error: Directory '{}' does not exist.",
                directory
            )));
        }

        tracing::debug!(directory = %target.display(), max_depth, "Listing files");

        let mut tree = format!("Directory structure of '{}':\n", directory);

        let walker = WalkDir::new(&target)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let indent = "  ".repeat(entry.depth() - 1);
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() {
                tree.push_str(&format!("{}- {}/\n", indent, name));
            } else {
                tree.push_str(&format!("{}- {}\n", indent, name));
            }
        }

        Ok(ToolResult::success(tree))
    }
}
