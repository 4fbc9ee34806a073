//! Agent identity and turn outcome types

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Model used when neither the builder nor the configuration names one
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Immutable description of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    name: String,
    role: String,
    instructions: String,
    model: String,
}

impl AgentIdentity {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            instructions: instructions.into(),
            model: model.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the system instruction sent with every request.
    pub fn system_instruction(&self, reply_language: &str) -> String {
        format!(
            "You are an AI agent named {}.\nRole: {}\n\nFollow these instructions:\n{}\n\nAlways reply in {}.",
            self.name, self.role, self.instructions, reply_language
        )
    }
}

/// How a single agent turn ended
#[derive(Debug)]
pub enum TurnOutcome {
    /// The model answered without requesting tools.
    Done { text: String },
    /// The model still wanted tools after the iteration limit.
    LimitExceeded {
        text: String,
        pending_calls: usize,
        max_iterations: usize,
    },
    /// The service could not be reached or refused the request.
    Fatal { error: Error },
}

impl TurnOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Text for the caller. Failures become a descriptive reply with a hint.
    pub fn render(&self, agent: &AgentIdentity) -> String {
        match self {
            Self::Done { text } => text.clone(),
            Self::LimitExceeded {
                text,
                pending_calls,
                max_iterations,
            } => format!(
                "{}\n\n[warning] Tool iteration limit ({}) reached; {} tool call(s) were not executed.",
                text, max_iterations, pending_calls
            ),
            Self::Fatal { error } => {
                let mut message = format!(
                    "Error: {} could not complete the request ({}): {}",
                    agent.name(),
                    error.kind(),
                    error
                );
                if let Some(hint) = error.hint(agent.model()) {
                    message.push_str("\nHint: ");
                    message.push_str(&hint);
                }
                message
            }
        }
    }
}

/// Outcome of a turn plus its counters
#[derive(Debug)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    /// Tool batches executed
    pub iterations: usize,
    /// Requests sent, not counting retries
    pub requests: usize,
}
