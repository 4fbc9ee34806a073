//! Shell command execution inside the project root
//!
//! Commands run through `sh -c` with the working directory fixed to the
//! scoped root and a hard timeout. A timed-out child is killed.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use crew_core::tool::{SchemaBuilder, required_str};
use crew_core::{Result, Tool, ToolResult};
use serde::Serialize;
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;

use crate::scope::ScopedRoot;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs shell commands in the project root
pub struct CommandTool {
    scope: ScopedRoot,
    timeout: Duration,
}

/// Output from command execution
#[derive(Debug, Serialize)]
struct CommandOutput {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

impl CommandTool {
    pub fn new(scope: ScopedRoot, timeout: Duration) -> Self {
        Self { scope, timeout }
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Run a shell command in the project root, e.g. to build or test the code. \
         Returns stdout, stderr and the exit code."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[("command", "string", "The command to execute", true)])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let command = required_str(&input, "command")?;

        tracing::debug!(
            command = %command,
            timeout_secs = self.timeout.as_secs(),
            "Executing command"
        );

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(self.scope.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(self.timeout, child).await {
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    exit_code: output.status.code(),
                };

                let text = serde_json::to_string_pretty(&result)?;

                if output.status.success() {
                    Ok(ToolResult::success(text))
                } else {
                    Ok(ToolResult::error(text))
                }
            }
            Ok(Err(e)) => Ok(ToolResult::error(format!("Failed to execute command: {}", e))),
            Err(_) => {
                tracing::warn!(command = %command, "Command timed out");
                Ok(ToolResult::error(format!(
                    "Error: Command timed out after {}s",
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}
