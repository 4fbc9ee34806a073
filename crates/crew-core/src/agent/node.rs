//! A single conversational agent
//!
//! An [`AgentNode`] owns its identity, its tools and its session. Turns are
//! serialized by the session lock; [`AgentNode::try_run_turn`] refuses
//! instead of waiting when a turn is already in flight.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::agent::observer::{AgentObserver, TracingObserver};
use crate::agent::tool_loop::{LoopSettings, ToolCallLoop};
use crate::agent::types::{AgentIdentity, DEFAULT_MODEL, TurnReport};
use crate::config::Config;
use crate::llm::{GeminiClient, LlmClient, Turn};
use crate::session::ConversationSession;
use crate::tool::ToolRegistry;
use crate::Result;

pub struct AgentNode {
    identity: AgentIdentity,
    system_instruction: String,
    client: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    observer: Arc<dyn AgentObserver>,
    settings: LoopSettings,
    session: Mutex<ConversationSession>,
}

impl std::fmt::Debug for AgentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentNode")
            .field("identity", &self.identity)
            .field("tools", &self.tools)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AgentNode {
    pub fn builder(
        name: impl Into<String>,
        role: impl Into<String>,
        instructions: impl Into<String>,
    ) -> AgentNodeBuilder {
        AgentNodeBuilder::new(name, role, instructions)
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names().into_iter().map(str::to_string).collect()
    }

    /// Send a message and return the rendered reply. Failures are described
    /// in the returned text.
    pub async fn send(&self, message: &str) -> String {
        let report = self.run_turn(message).await;
        report.outcome.render(&self.identity)
    }

    /// Run one turn, waiting for any turn already in flight.
    pub async fn run_turn(&self, message: &str) -> TurnReport {
        let mut session = self.session.lock().await;
        self.turn(&mut session, message).await
    }

    /// Run one turn unless this agent is already busy.
    pub async fn try_run_turn(&self, message: &str) -> Option<TurnReport> {
        let Ok(mut session) = self.session.try_lock() else {
            debug!(agent = %self.name(), "Agent busy; refusing nested turn");
            return None;
        };
        Some(self.turn(&mut session, message).await)
    }

    async fn turn(&self, session: &mut ConversationSession, message: &str) -> TurnReport {
        info!(agent = %self.name(), "Starting turn");
        let tool_loop = ToolCallLoop {
            identity: &self.identity,
            system_instruction: &self.system_instruction,
            client: self.client.as_ref(),
            tools: &self.tools,
            observer: self.observer.as_ref(),
            settings: &self.settings,
        };
        tool_loop.run(session, message).await
    }

    /// Snapshot of the conversation so far. Waits for an in-flight turn.
    pub async fn transcript(&self) -> Vec<Turn> {
        self.session.lock().await.turns().to_vec()
    }

    pub async fn turn_count(&self) -> usize {
        self.session.lock().await.len()
    }
}

/// Builder for [`AgentNode`]
pub struct AgentNodeBuilder {
    name: String,
    role: String,
    instructions: String,
    model: Option<String>,
    config: Option<Config>,
    pub(crate) client: Option<Arc<dyn LlmClient>>,
    pub(crate) tools: ToolRegistry,
    observer: Option<Arc<dyn AgentObserver>>,
    settings: Option<LoopSettings>,
}

impl AgentNodeBuilder {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            instructions: instructions.into(),
            model: None,
            config: None,
            client: None,
            tools: ToolRegistry::empty(),
            observer: None,
            settings: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this client instead of building a Gemini client from the config.
    pub fn client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn AgentObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn settings(mut self, settings: LoopSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve every defaulted collaborator. Fails when a Gemini client is
    /// needed but no API key is configured.
    pub(crate) fn collaborators(&self) -> Result<Collaborators> {
        let default_config;
        let config = match &self.config {
            Some(config) => config,
            None => {
                default_config = Config::default();
                &default_config
            }
        };

        let model = match &self.model {
            Some(model) => model.clone(),
            None if !config.llm.model.trim().is_empty() => config.llm.model.trim().to_string(),
            None => DEFAULT_MODEL.to_string(),
        };

        let client: Arc<dyn LlmClient> = match &self.client {
            Some(client) => client.clone(),
            None => Arc::new(GeminiClient::new(&config.llm)?),
        };

        let observer: Arc<dyn AgentObserver> = match &self.observer {
            Some(observer) => observer.clone(),
            None => Arc::new(TracingObserver),
        };

        Ok(Collaborators {
            model,
            client,
            observer,
            settings: self
                .settings
                .clone()
                .unwrap_or_else(|| LoopSettings::from_config(config)),
            reply_language: config.agent.reply_language.clone(),
        })
    }

    pub fn build(self) -> Result<AgentNode> {
        let Collaborators {
            model,
            client,
            observer,
            settings,
            reply_language,
        } = self.collaborators()?;

        let identity = AgentIdentity::new(self.name, self.role, self.instructions, model);
        let system_instruction = identity.system_instruction(&reply_language);

        Ok(AgentNode {
            identity,
            system_instruction,
            client,
            tools: self.tools,
            observer,
            settings,
            session: Mutex::new(ConversationSession::new()),
        })
    }
}

/// Collaborators of a node after defaults are applied
pub(crate) struct Collaborators {
    pub model: String,
    pub client: Arc<dyn LlmClient>,
    pub observer: Arc<dyn AgentObserver>,
    pub settings: LoopSettings,
    pub reply_language: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::test_support::{ScriptedClient, text};
    use std::time::Duration;

    fn quick() -> LoopSettings {
        LoopSettings {
            request_interval: Duration::ZERO,
            ..LoopSettings::default()
        }
    }

    #[test]
    fn test_missing_key_fails_at_build() {
        let err = AgentNode::builder("Coder", "Programmer", "Write code.")
            .config(Config::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_model_resolution() {
        let client: Arc<dyn LlmClient> = Arc::new(ScriptedClient::default());

        let explicit = AgentNode::builder("A", "r", "i")
            .client(client.clone())
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        assert_eq!(explicit.identity().model(), "gemini-2.0-flash");

        let mut config = Config::default();
        config.llm.model = "gemini-flash-latest".to_string();
        let configured = AgentNode::builder("A", "r", "i")
            .client(client.clone())
            .config(config)
            .build()
            .unwrap();
        assert_eq!(configured.identity().model(), "gemini-flash-latest");

        let mut config = Config::default();
        config.llm.model = String::new();
        let fallback = AgentNode::builder("A", "r", "i")
            .client(client)
            .config(config)
            .build()
            .unwrap();
        assert_eq!(fallback.identity().model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_system_instruction_uses_reply_language() {
        let mut config = Config::default();
        config.agent.reply_language = "English".to_string();
        let node = AgentNode::builder("Architect", "Designer", "Design.")
            .client(Arc::new(ScriptedClient::default()))
            .config(config)
            .build()
            .unwrap();
        assert!(node.system_instruction().ends_with("Always reply in English."));
    }

    #[tokio::test]
    async fn test_send_returns_reply_and_records_turns() {
        let client = Arc::new(ScriptedClient::new(vec![text("first"), text("second")]));
        let node = AgentNode::builder("Coder", "Programmer", "Write code.")
            .client(client.clone())
            .settings(quick())
            .build()
            .unwrap();

        assert_eq!(node.send("one").await, "first");
        assert_eq!(node.send("two").await, "second");
        assert_eq!(node.turn_count().await, 4);

        // the second request carries the first exchange
        assert_eq!(client.requests()[1].history.len(), 3);
        assert_eq!(node.transcript().await[0], Turn::user("one"));
    }

    #[tokio::test]
    async fn test_send_renders_failures() {
        let client = Arc::new(ScriptedClient::new(vec![Err(Error::Api {
            status: 404,
            message: "not found".to_string(),
        })]));
        let node = AgentNode::builder("Coder", "Programmer", "Write code.")
            .client(client)
            .settings(quick())
            .build()
            .unwrap();

        let reply = node.send("hi").await;
        assert!(reply.starts_with("Error: Coder could not complete the request"));
        assert!(reply.contains("--list-models"));
        assert_eq!(node.turn_count().await, 0);
    }

    #[tokio::test]
    async fn test_try_run_turn_when_idle() {
        let node = AgentNode::builder("Coder", "Programmer", "Write code.")
            .client(Arc::new(ScriptedClient::new(vec![text("ok")])))
            .settings(quick())
            .build()
            .unwrap();

        let report = node.try_run_turn("hi").await.unwrap();
        assert!(report.outcome.is_done());
    }
}
