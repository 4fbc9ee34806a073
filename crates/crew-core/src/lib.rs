//! crew-core: agents, tools and the Gemini client behind the crew team
//!
//! A [`Manager`] breaks user requests into tasks and hands them to
//! subordinate [`AgentNode`]s. Each node drives its own tool-call loop
//! against an [`LlmClient`].

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod tool;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{
    AgentIdentity, AgentNode, AgentNodeBuilder, AgentObserver, LoopSettings, Manager,
    NoopObserver, RetryPolicy, TracingObserver, TurnOutcome, TurnReport,
};
pub use config::{AgentConfig, Config, LlmConfig, RetryConfig, WorkspaceConfig};
pub use error::{Error, Result};
pub use llm::{GeminiClient, LlmClient, ToolDefinition};
pub use session::ConversationSession;
pub use tool::{Tool, ToolRegistry, ToolResult};
