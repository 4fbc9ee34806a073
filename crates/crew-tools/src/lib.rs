//! crew-tools: file and command tools for the crew agents
//!
//! Every tool is confined to a [`ScopedRoot`].

pub mod command;
pub mod list;
pub mod scope;
pub mod write;

pub use command::{CommandTool, DEFAULT_COMMAND_TIMEOUT};
pub use list::ListFilesTool;
pub use scope::ScopedRoot;
pub use write::WriteFileTool;

use std::sync::Arc;
use std::time::Duration;

use crew_core::ToolRegistry;

/// Tools for the Architect: `write_design_doc` and `list_project_files`
pub fn architect_tools(root: &ScopedRoot) -> ToolRegistry {
    ToolRegistry::builder()
        .tool(Arc::new(WriteFileTool::design_doc(root.clone())))
        .tool(Arc::new(ListFilesTool::new(root.clone())))
        .build()
}

/// Tools for the Coder: `write_file`, `list_project_files` and `run_command`
pub fn coder_tools(root: &ScopedRoot, command_timeout: Duration) -> ToolRegistry {
    ToolRegistry::builder()
        .tool(Arc::new(WriteFileTool::new(root.clone())))
        .tool(Arc::new(ListFilesTool::new(root.clone())))
        .tool(Arc::new(CommandTool::new(root.clone(), command_timeout)))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_role_tool_sets() {
        let dir = TempDir::new().unwrap();
        let root = ScopedRoot::new(dir.path()).unwrap();

        assert_eq!(
            architect_tools(&root).names(),
            vec!["write_design_doc", "list_project_files"]
        );
        assert_eq!(
            coder_tools(&root, DEFAULT_COMMAND_TIMEOUT).names(),
            vec!["write_file", "list_project_files", "run_command"]
        );
    }
}
