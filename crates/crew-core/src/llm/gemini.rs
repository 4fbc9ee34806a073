//! Gemini `generateContent` wire format
//!
//! Converts between the provider-neutral types in [`super::types`] and the
//! JSON the Gemini REST API expects.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::types::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tools: Vec<GeminiTool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<GeminiFunctionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionResponse {
    pub name: String,
    pub response: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModelList {
    #[serde(default)]
    pub models: Vec<GeminiModel>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModel {
    pub name: String,
    pub display_name: Option<String>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl From<&ToolInvocationResult> for GeminiPart {
    fn from(result: &ToolInvocationResult) -> Self {
        let key = if result.is_error { "error" } else { "result" };
        let mut response = serde_json::Map::new();
        response.insert(key.to_string(), JsonValue::String(result.payload.clone()));
        Self {
            function_response: Some(GeminiFunctionResponse {
                name: result.name.clone(),
                response: JsonValue::Object(response),
            }),
            ..Default::default()
        }
    }
}

impl From<&Turn> for GeminiContent {
    fn from(turn: &Turn) -> Self {
        match turn {
            Turn::User { text } => Self {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(text)],
            },
            Turn::Model { text, tool_calls } => {
                let mut parts = Vec::new();
                if let Some(text) = text.as_ref().filter(|t| !t.is_empty()) {
                    parts.push(GeminiPart::text(text));
                }
                for call in tool_calls {
                    parts.push(GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: call.name.clone(),
                            args: Some(JsonValue::Object(call.args.clone())),
                        }),
                        ..Default::default()
                    });
                }
                Self {
                    role: Some("model".to_string()),
                    parts,
                }
            }
            Turn::ToolResults { results } => Self {
                role: Some("user".to_string()),
                parts: results.iter().map(GeminiPart::from).collect(),
            },
        }
    }
}

impl From<&ToolDefinition> for GeminiFunctionDeclaration {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        }
    }
}

impl GeminiRequest {
    pub fn from_request(request: &GenerateRequest) -> Self {
        let tools = if request.tools.is_empty() {
            vec![]
        } else {
            vec![GeminiTool {
                function_declarations: request.tools.iter().map(Into::into).collect(),
            }]
        };

        Self {
            system_instruction: request.system_instruction.as_ref().map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(s)],
            }),
            // the service rejects contents without parts
            contents: request
                .history
                .iter()
                .map(GeminiContent::from)
                .filter(|c| !c.parts.is_empty())
                .collect(),
            tools,
        }
    }
}

impl GeminiResponse {
    /// Collapse the first candidate into a [`GenerateResponse`].
    ///
    /// Text parts are concatenated; function calls keep their order.
    pub fn into_response(self) -> Result<GenerateResponse> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("No candidates in Gemini response".to_string()))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(ToolInvocationRequest::from_value(
                    fc.name,
                    fc.args.unwrap_or(JsonValue::Null),
                ));
            }
        }

        Ok(GenerateResponse {
            text: if text.is_empty() { None } else { Some(text) },
            tool_calls,
            usage: self.usage_metadata.map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            }),
        })
    }
}

impl From<GeminiModel> for ModelInfo {
    fn from(model: GeminiModel) -> Self {
        Self {
            name: model.name,
            display_name: model.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "gemini-1.5-flash".to_string(),
            system_instruction: Some("be brief".to_string()),
            history: vec![
                Turn::user("hi"),
                Turn::Model {
                    text: None,
                    tool_calls: vec![ToolInvocationRequest::new("list_project_files", Map::new())],
                },
                Turn::tool_results(vec![ToolInvocationResult::success("list_project_files", "- a.rs")]),
            ],
            tools: vec![ToolDefinition::new("list_project_files", "List files", json!({"type": "object"}))],
        };

        let body = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["functionCall"]["name"], "list_project_files");
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"]["response"]["result"],
            "- a.rs"
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "list_project_files"
        );
    }

    #[test]
    fn test_empty_model_turn_is_not_sent() {
        let request = GenerateRequest {
            model: "m".to_string(),
            history: vec![
                Turn::user("hi"),
                GenerateResponse::default().to_turn(),
                Turn::user("again"),
            ],
            ..Default::default()
        };

        let body = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();
        let contents = body["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 2);
        assert!(contents.iter().all(|c| !c["parts"].as_array().unwrap().is_empty()));
        assert_eq!(contents[1]["parts"][0]["text"], "again");
    }

    #[test]
    fn test_error_results_use_error_key() {
        let part = GeminiPart::from(&ToolInvocationResult::error("x", "Tool 'x' not found"));
        let response = part.function_response.unwrap().response;
        assert_eq!(response["error"], "Tool 'x' not found");
    }

    #[test]
    fn test_no_tools_omits_field() {
        let request = GenerateRequest::one_shot("m", None, "hello");
        let body = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_with_text_and_calls() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Let me check. "},
                        {"functionCall": {"name": "delegate_task", "args": {"agent_name": "Architect", "task_content": "design"}}},
                        {"functionCall": {"name": "decompose_task", "args": {"requirements": "login"}}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 7, "totalTokenCount": 19}
        });

        let parsed: GeminiResponse = serde_json::from_value(raw).unwrap();
        let response = parsed.into_response().unwrap();

        assert_eq!(response.text.as_deref(), Some("Let me check. "));
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].name, "delegate_task");
        assert_eq!(response.tool_calls[0].args["agent_name"], "Architect");
        assert_eq!(response.tool_calls[1].name, "decompose_task");
        assert_eq!(response.usage.unwrap().output_tokens, 7);
    }

    #[test]
    fn test_response_without_candidates_is_invalid() {
        let parsed: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(matches!(parsed.into_response(), Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_candidate_without_content_yields_empty_response() {
        let parsed: GeminiResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        let response = parsed.into_response().unwrap();
        assert!(response.text.is_none());
        assert!(response.tool_calls.is_empty());
    }
}
