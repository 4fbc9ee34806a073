//! Requirement decomposition
//!
//! The model is asked for a JSON array of task strings in a one-shot
//! request. Anything unusable falls back to a fixed four-step plan.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::Result;
use crate::agent::observer::AgentObserver;
use crate::agent::tool_loop::LoopSettings;
use crate::llm::{GenerateRequest, LlmClient};
use crate::tool::{SchemaBuilder, Tool, ToolResult, required_str};

pub const DEFAULT_TASKS: [&str; 4] = [
    "Requirements analysis",
    "Architecture design",
    "Implementation",
    "Testing",
];

const DECOMPOSE_SYSTEM: &str = "You break software requirements into an ordered list of concrete tasks. \
Answer with a JSON array of short task descriptions (strings) and nothing else.";

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+.-]*[ \t]*\r?\n?(.*?)```").expect("valid regex")
});

pub fn default_tasks() -> Vec<String> {
    DEFAULT_TASKS.iter().map(|t| t.to_string()).collect()
}

/// Extract a list of task strings from a model reply.
///
/// Uses the first fenced code block when present, otherwise the whole text.
/// Falls back to the span between the first `[` and the last `]`. Empty
/// lists and non-string items count as failures.
pub fn parse_task_list(text: &str) -> Option<Vec<String>> {
    let body = FENCED_BLOCK
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
        .trim();

    parse_string_array(body).or_else(|| {
        let start = body.find('[')?;
        let end = body.rfind(']')?;
        (start < end)
            .then(|| parse_string_array(&body[start..=end]))
            .flatten()
    })
}

fn parse_string_array(text: &str) -> Option<Vec<String>> {
    let tasks: Vec<String> = serde_json::from_str(text).ok()?;
    let tasks: Vec<String> = tasks
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    (!tasks.is_empty()).then_some(tasks)
}

/// Turns free-form requirements into a task list via the model
pub struct TaskDecomposer {
    agent: String,
    model: String,
    client: Arc<dyn LlmClient>,
    settings: LoopSettings,
    observer: Arc<dyn AgentObserver>,
}

impl TaskDecomposer {
    pub fn new(
        agent: impl Into<String>,
        model: impl Into<String>,
        client: Arc<dyn LlmClient>,
        settings: LoopSettings,
        observer: Arc<dyn AgentObserver>,
    ) -> Self {
        Self {
            agent: agent.into(),
            model: model.into(),
            client,
            settings,
            observer,
        }
    }

    /// Never fails; unusable replies yield [`default_tasks`].
    pub async fn decompose(&self, requirements: &str) -> Vec<String> {
        let request = GenerateRequest::one_shot(
            &self.model,
            Some(DECOMPOSE_SYSTEM.to_string()),
            format!("Requirements:\n{}", requirements),
        );

        self.observer.on_thinking(&self.agent);
        tokio::time::sleep(self.settings.request_interval).await;

        let result = self
            .settings
            .retry
            .execute_with(
                |state, error| self.observer.on_retry(&self.agent, state, error),
                || self.client.generate(&request),
            )
            .await;

        let tasks = match result {
            Ok(response) => {
                let text = response.text.unwrap_or_default();
                parse_task_list(&text).unwrap_or_else(|| {
                    warn!(agent = %self.agent, reply = %text, "Unparsable task list; using default plan");
                    default_tasks()
                })
            }
            Err(e) => {
                warn!(agent = %self.agent, error = %e, "Decomposition request failed; using default plan");
                default_tasks()
            }
        };

        debug!(agent = %self.agent, count = tasks.len(), "Decomposed requirements");
        self.observer.on_decompose(&self.agent, &tasks);
        tasks
    }
}

/// `decompose_task` tool: returns the task list as JSON array text
pub struct DecomposeTool {
    decomposer: Arc<TaskDecomposer>,
}

impl DecomposeTool {
    pub fn new(decomposer: Arc<TaskDecomposer>) -> Self {
        Self { decomposer }
    }
}

#[async_trait]
impl Tool for DecomposeTool {
    fn name(&self) -> &str {
        "decompose_task"
    }

    fn description(&self) -> &str {
        "Break the user's requirements into a list of concrete tasks."
    }

    fn input_schema(&self) -> JsonValue {
        SchemaBuilder::object_schema(&[(
            "requirements",
            "string",
            "The user's request or requirements",
            true,
        )])
    }

    async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
        let requirements = required_str(&input, "requirements")?;
        let tasks = self.decomposer.decompose(requirements).await;
        Ok(ToolResult::success(serde_json::to_string(&tasks)?))
    }
}
