//! Provider-neutral conversation and tool-call types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A tool invocation requested by the model inside a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    pub name: String,
    /// Arguments in the order the service emitted them
    #[serde(default)]
    pub args: Map<String, JsonValue>,
}

impl ToolInvocationRequest {
    pub fn new(name: impl Into<String>, args: Map<String, JsonValue>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Build from any JSON value; non-object values yield empty arguments.
    pub fn from_value(name: impl Into<String>, args: JsonValue) -> Self {
        let args = match args {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(name, args)
    }
}

/// Outcome of running one requested tool, fed back to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    pub name: String,
    pub payload: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolInvocationResult {
    pub fn success(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            is_error: false,
        }
    }

    pub fn error(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            is_error: true,
        }
    }
}

/// One entry of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Turn {
    User {
        text: String,
    },
    Model {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        tool_calls: Vec<ToolInvocationRequest>,
    },
    ToolResults {
        results: Vec<ToolInvocationResult>,
    },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn tool_results(results: Vec<ToolInvocationResult>) -> Self {
        Self::ToolResults { results }
    }

    /// Short label used for history listings
    pub fn label(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Model { .. } => "model",
            Self::ToolResults { .. } => "tool",
        }
    }

    /// Plain-text rendering of the turn
    pub fn text_content(&self) -> String {
        match self {
            Self::User { text } => text.clone(),
            Self::Model { text, tool_calls } => {
                let mut parts: Vec<String> = text.iter().cloned().collect();
                parts.extend(tool_calls.iter().map(|c| format!("[call {}]", c.name)));
                parts.join("\n")
            }
            Self::ToolResults { results } => results
                .iter()
                .map(|r| format!("[{}] {}", r.name, r.payload))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Tool definition announced to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A single request to the service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    /// Full history including the content being submitted now
    pub history: Vec<Turn>,
    pub tools: Vec<ToolDefinition>,
}

impl GenerateRequest {
    /// A history-free request with a single user message and no tools
    pub fn one_shot(model: impl Into<String>, system: Option<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system,
            history: vec![Turn::user(text)],
            tools: vec![],
        }
    }
}

/// The service's answer to a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolInvocationRequest>,
    pub usage: Option<Usage>,
}

impl GenerateResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn tool_calls(calls: Vec<ToolInvocationRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// The model turn to record in a session
    pub fn to_turn(&self) -> Turn {
        Turn::Model {
            text: self.text.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A model offered by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
}
