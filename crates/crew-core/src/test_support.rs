//! Scripted LLM client for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::llm::{GenerateRequest, GenerateResponse, LlmClient, ToolInvocationRequest};

/// Replays queued responses and records every request it sees.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<GenerateResponse>>>,
    fallback: Option<GenerateResponse>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<GenerateResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    /// Answer with `response` once the script runs out.
    pub fn repeating(response: GenerateResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| Error::InvalidResponse("script exhausted".to_string())),
        }
    }
}

pub fn text(text: &str) -> Result<GenerateResponse> {
    Ok(GenerateResponse::text(text))
}

pub fn call(name: &str, args: JsonValue) -> ToolInvocationRequest {
    ToolInvocationRequest::from_value(name, args)
}

pub fn calls(calls: Vec<ToolInvocationRequest>) -> Result<GenerateResponse> {
    Ok(GenerateResponse::tool_calls(calls))
}
