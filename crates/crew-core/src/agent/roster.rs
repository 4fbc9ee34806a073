//! Delegation edges from a manager to its team
//!
//! The roster holds weak references only: the owner of a subordinate decides
//! its lifetime, and a dropped member resolves to a "no longer available"
//! reply instead of being recreated.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::Result;
use crate::agent::node::AgentNode;
use crate::agent::observer::AgentObserver;
use crate::tool::{SchemaBuilder, Tool, ToolResult, required_str};

pub struct Roster {
    owner: String,
    members: RwLock<BTreeMap<String, Weak<AgentNode>>>,
    observer: Arc<dyn AgentObserver>,
}

impl Roster {
    pub fn new(owner: impl Into<String>, observer: Arc<dyn AgentObserver>) -> Self {
        Self {
            owner: owner.into(),
            members: RwLock::new(BTreeMap::new()),
            observer,
        }
    }

    /// Add or replace the edge for `name`.
    pub async fn register(&self, name: impl Into<String>, agent: &Arc<AgentNode>) {
        let name = name.into();
        info!(manager = %self.owner, member = %name, "Registering team member");
        self.members
            .write()
            .await
            .insert(name.clone(), Arc::downgrade(agent));
        self.observer.on_member_registered(&self.owner, &name);
    }

    /// Registered names, sorted
    pub async fn names(&self) -> Vec<String> {
        self.members.read().await.keys().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<AgentNode>> {
        self.members.read().await.get(name).and_then(Weak::upgrade)
    }

    /// Forward `content` to the named member and wait for its reply.
    ///
    /// Every failure mode is described in the returned text.
    pub async fn delegate(&self, name: &str, content: &str) -> String {
        let edge = {
            let members = self.members.read().await;
            match members.get(name) {
                Some(edge) => edge.clone(),
                None => {
                    let available: Vec<&str> = members.keys().map(String::as_str).collect();
                    warn!(manager = %self.owner, agent = name, "Delegation to unknown agent");
                    return format!(
                        "Error: Agent {} is not in the team. Available agents: [{}]",
                        name,
                        available.join(", ")
                    );
                }
            }
        };

        let Some(agent) = edge.upgrade() else {
            warn!(manager = %self.owner, agent = name, "Delegation to dropped agent");
            return format!(
                "Error: Agent {} is no longer available. Register it again or choose another agent.",
                name
            );
        };

        self.observer.on_delegate(&self.owner, name, content);

        match agent.try_run_turn(content).await {
            Some(report) => format!(
                "Response from {}: {}",
                name,
                report.outcome.render(agent.identity())
            ),
            None => {
                warn!(manager = %self.owner, agent = name, "Delegation refused; agent busy");
                format!(
                    "Error: Agent {} is busy with another request (a delegation cycle?). Choose another agent.",
                    name
                )
            }
        }
    }
}

/// `delegate_task` tool: forwards a task to a team member
pub struct DelegateTool {
    roster: Arc<Roster>,
}

impl DelegateTool {
    pub fn new(roster: Arc<Roster>) -> Self {
        Self { roster }
    }
}

#[async_trait]
impl Tool for DelegateTool {
    fn name(&self) -> &str {
        "delegate_task"
    }

    fn description(&self) -> &str {
        "Ask a team member to carry out a task and return their answer. \
         Available agents are the registered team members, e.g. Architect (design) and Coder (implementation)."
    }

    fn input_schema(&self) -> JsonValue {
        SchemaBuilder::object_schema(&[
            ("agent_name", "string", "Name of the team member to ask", true),
            ("task_content", "string", "The concrete task to hand over", true),
        ])
    }

    async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
        let agent_name = required_str(&input, "agent_name")?;
        let task_content = required_str(&input, "task_content")?;
        let reply = self.roster.delegate(agent_name, task_content).await;
        Ok(ToolResult::success(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::observer::NoopObserver;
    use crate::agent::tool_loop::LoopSettings;
    use crate::test_support::{ScriptedClient, text};
    use serde_json::json;
    use std::time::Duration;

    fn roster() -> Arc<Roster> {
        Arc::new(Roster::new("Manager", Arc::new(NoopObserver)))
    }

    fn member(name: &str, replies: Vec<crate::Result<crate::llm::GenerateResponse>>) -> Arc<AgentNode> {
        Arc::new(
            AgentNode::builder(name, "Member", "Help.")
                .client(Arc::new(ScriptedClient::new(replies)))
                .settings(LoopSettings {
                    request_interval: Duration::ZERO,
                    ..LoopSettings::default()
                })
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_unknown_agent_lists_team() {
        let roster = roster();
        let architect = member("Architect", vec![]);
        let coder = member("Coder", vec![]);
        roster.register("Coder", &coder).await;
        roster.register("Architect", &architect).await;

        let reply = roster.delegate("Unknown", "x").await;
        assert_eq!(
            reply,
            "Error: Agent Unknown is not in the team. Available agents: [Architect, Coder]"
        );
    }

    #[tokio::test]
    async fn test_delegate_wraps_reply() {
        let roster = roster();
        let architect = member("Architect", vec![text("design.md written")]);
        roster.register("Architect", &architect).await;

        let reply = roster.delegate("Architect", "design a login").await;
        assert_eq!(reply, "Response from Architect: design.md written");
        assert_eq!(architect.turn_count().await, 2);
    }

    #[tokio::test]
    async fn test_dropped_member_is_unavailable() {
        let roster = roster();
        let coder = member("Coder", vec![]);
        roster.register("Coder", &coder).await;
        drop(coder);

        let reply = roster.delegate("Coder", "x").await;
        assert!(reply.starts_with("Error: Agent Coder is no longer available."));
        assert_eq!(roster.names().await, vec!["Coder"]);
        assert!(roster.get("Coder").await.is_none());
    }

    #[tokio::test]
    async fn test_register_overwrites() {
        let roster = roster();
        let first = member("Coder", vec![text("first")]);
        let second = member("Coder", vec![text("second")]);
        roster.register("Coder", &first).await;
        roster.register("Coder", &second).await;

        assert_eq!(roster.delegate("Coder", "x").await, "Response from Coder: second");
    }

    #[tokio::test]
    async fn test_delegate_tool_requires_arguments() {
        let tool = DelegateTool::new(roster());
        assert!(tool.execute(json!({"agent_name": "Coder"})).await.is_err());

        let result = tool
            .execute(json!({"agent_name": "Nobody", "task_content": "x"}))
            .await
            .unwrap();
        assert!(result.output.contains("is not in the team"));
    }
}
