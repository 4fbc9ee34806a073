//! Shared test helpers and a scripted LLM client.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crew_core::agent::{AgentObserver, LoopSettings, RetryPolicy, RetryState};
use crew_core::llm::{GenerateRequest, GenerateResponse, LlmClient, ToolInvocationRequest};
use crew_core::{Error, Result};

/// A client that replays queued responses and records requests.
#[derive(Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<GenerateResponse>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a text response.
    pub fn queue_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(GenerateResponse::text(text)));
    }

    /// Queue a single tool call response.
    pub fn queue_tool_call(&self, name: &str, args: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(GenerateResponse::tool_calls(vec![
                ToolInvocationRequest::from_value(name, args),
            ])));
    }

    pub fn queue_error(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerateResponse::text("Mock response")))
    }
}

/// Observer that records events as short strings.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl AgentObserver for RecordingObserver {
    fn on_retry(&self, agent: &str, state: &RetryState, _error: &Error) {
        self.push(format!("retry {} {} {}s", agent, state.attempt, state.delay.as_secs()));
    }

    fn on_delegate(&self, from: &str, to: &str, _task: &str) {
        self.push(format!("delegate {} -> {}", from, to));
    }

    fn on_decompose(&self, agent: &str, tasks: &[String]) {
        self.push(format!("decompose {} {}", agent, tasks.len()));
    }

    fn on_member_registered(&self, manager: &str, member: &str) {
        self.push(format!("register {} {}", manager, member));
    }

    fn on_limit_reached(&self, agent: &str, max_iterations: usize, _pending_calls: usize) {
        self.push(format!("limit {} {}", agent, max_iterations));
    }
}

/// Settings without pacing, for tests that don't pause time.
pub fn unpaced(max_iterations: usize) -> LoopSettings {
    LoopSettings {
        max_iterations,
        request_interval: Duration::ZERO,
        retry: RetryPolicy::default(),
    }
}
