//! Team assembly: a Manager with the Architect and Coder registered

use std::sync::Arc;

use anyhow::Context;
use crew_core::agent::profiles::{ARCHITECT, CODER, MANAGER};
use crew_core::agent::TurnReport;
use crew_core::{AgentNode, AgentObserver, Config, GeminiClient, LlmClient, Manager};
use crew_tools::{ScopedRoot, architect_tools, coder_tools};
use tracing::info;

/// The running team
///
/// The manager holds only weak references to its members, so the team
/// owns them for as long as it lives.
pub struct Team {
    manager: Manager,
    members: Vec<Arc<AgentNode>>,
    scope: ScopedRoot,
}

impl Team {
    /// Build the team against Gemini with one client shared by all agents.
    pub async fn assemble(config: &Config, observer: Arc<dyn AgentObserver>) -> anyhow::Result<Self> {
        let client = GeminiClient::new(config.llm_config())
            .context("Failed to create LLM client")?;
        Self::with_client(config, Arc::new(client), observer).await
    }

    pub async fn with_client(
        config: &Config,
        client: Arc<dyn LlmClient>,
        observer: Arc<dyn AgentObserver>,
    ) -> anyhow::Result<Self> {
        let root = &config.workspace.root;
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create workspace root {}", root.display()))?;
        let scope = ScopedRoot::new(root)
            .with_context(|| format!("Invalid workspace root {}", root.display()))?;

        let manager = Manager::new(
            MANAGER
                .builder()
                .config(config.clone())
                .client(client.clone())
                .observer(observer.clone()),
        )?;

        let architect = Arc::new(
            ARCHITECT
                .builder()
                .config(config.clone())
                .client(client.clone())
                .observer(observer.clone())
                .tools(architect_tools(&scope))
                .build()?,
        );
        let coder = Arc::new(
            CODER
                .builder()
                .config(config.clone())
                .client(client)
                .observer(observer)
                .tools(coder_tools(&scope, config.workspace.command_timeout()))
                .build()?,
        );

        manager.register_subordinate(architect.name(), &architect).await;
        manager.register_subordinate(coder.name(), &coder).await;

        info!(
            root = %scope.path().display(),
            model = %manager.node().identity().model(),
            "Team assembled"
        );

        Ok(Self {
            manager,
            members: vec![architect, coder],
            scope,
        })
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn members(&self) -> &[Arc<AgentNode>] {
        &self.members
    }

    pub fn root(&self) -> &ScopedRoot {
        &self.scope
    }

    /// Run one Manager turn and render its outcome.
    pub async fn ask(&self, message: &str) -> (TurnReport, String) {
        let report = self.manager.run_turn(message).await;
        let reply = report.outcome.render(self.manager.node().identity());
        (report, reply)
    }
}
