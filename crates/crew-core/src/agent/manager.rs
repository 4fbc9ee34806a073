//! Manager agent: an agent node that can decompose work and delegate it

use std::sync::Arc;

use crate::Result;
use crate::agent::decompose::{DecomposeTool, TaskDecomposer};
use crate::agent::node::{AgentNode, AgentNodeBuilder};
use crate::agent::roster::{DelegateTool, Roster};
use crate::agent::types::TurnReport;
use crate::tool::ToolRegistry;

/// An [`AgentNode`] whose registry carries `decompose_task` and
/// `delegate_task` in front of any tools set on the builder
pub struct Manager {
    node: Arc<AgentNode>,
    roster: Arc<Roster>,
    decomposer: Arc<TaskDecomposer>,
}

impl Manager {
    pub fn new(builder: AgentNodeBuilder) -> Result<Self> {
        let collaborators = builder.collaborators()?;

        let roster = Arc::new(Roster::new(builder.name(), collaborators.observer.clone()));
        let decomposer = Arc::new(TaskDecomposer::new(
            builder.name(),
            collaborators.model,
            collaborators.client.clone(),
            collaborators.settings,
            collaborators.observer,
        ));

        let tools = ToolRegistry::builder()
            .tool(Arc::new(DecomposeTool::new(decomposer.clone())))
            .tool(Arc::new(DelegateTool::new(roster.clone())))
            .extend(&builder.tools)
            .build();

        let node = builder.client(collaborators.client).tools(tools).build()?;

        Ok(Self {
            node: Arc::new(node),
            roster,
            decomposer,
        })
    }

    /// Add a subordinate. The manager keeps only a weak reference.
    pub async fn register_subordinate(&self, name: impl Into<String>, agent: &Arc<AgentNode>) {
        self.roster.register(name, agent).await;
    }

    pub async fn delegate(&self, agent_name: &str, task_content: &str) -> String {
        self.roster.delegate(agent_name, task_content).await
    }

    pub async fn decompose(&self, requirements: &str) -> Vec<String> {
        self.decomposer.decompose(requirements).await
    }

    pub async fn send(&self, message: &str) -> String {
        self.node.send(message).await
    }

    pub async fn run_turn(&self, message: &str) -> TurnReport {
        self.node.run_turn(message).await
    }

    /// Names of registered subordinates, sorted
    pub async fn members(&self) -> Vec<String> {
        self.roster.names().await
    }

    pub fn node(&self) -> &Arc<AgentNode> {
        &self.node
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }
}
