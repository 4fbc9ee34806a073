//! One agent turn across zero or more tool round-trips
//!
//! Each iteration paces, sends the history plus the pending content through
//! the retry policy, records the exchange, and either finishes or runs the
//! requested tools in order and feeds their results back.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::agent::observer::AgentObserver;
use crate::agent::retry::RetryPolicy;
use crate::agent::types::{AgentIdentity, TurnOutcome, TurnReport};
use crate::config::Config;
use crate::llm::{GenerateRequest, LlmClient, ToolInvocationResult, Turn};
use crate::session::ConversationSession;
use crate::tool::ToolRegistry;

/// Limits and pacing for a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    /// Tool batches allowed per turn
    pub max_iterations: usize,
    /// Wait before every outbound request
    pub request_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            request_interval: Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_iterations: config.agent.max_iterations,
            request_interval: config.agent.request_interval(),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }
}

/// Borrowed view of everything one turn needs
pub struct ToolCallLoop<'a> {
    pub identity: &'a AgentIdentity,
    pub system_instruction: &'a str,
    pub client: &'a dyn LlmClient,
    pub tools: &'a ToolRegistry,
    pub observer: &'a dyn AgentObserver,
    pub settings: &'a LoopSettings,
}

const NOT_EXECUTED: &str = "Not executed: tool iteration limit reached.";

/// Recorded in place of a reply that carried neither text nor tool calls
const EMPTY_REPLY: &str = "(no response)";

impl ToolCallLoop<'_> {
    /// Drive one turn to completion. Never fails; failures are reported in
    /// the outcome.
    pub async fn run(&self, session: &mut ConversationSession, message: &str) -> TurnReport {
        let agent = self.identity.name();
        let definitions = self.tools.definitions();
        let mut pending = Turn::user(message);
        let mut iterations = 0;
        let mut requests = 0;

        loop {
            self.observer.on_thinking(agent);
            tokio::time::sleep(self.settings.request_interval).await;

            let mut history = session.turns().to_vec();
            history.push(pending.clone());
            let request = GenerateRequest {
                model: self.identity.model().to_string(),
                system_instruction: Some(self.system_instruction.to_string()),
                history,
                tools: definitions.clone(),
            };

            requests += 1;
            debug!(agent, iterations, requests, "Sending request");

            let result = self
                .settings
                .retry
                .execute_with(
                    |state, error| self.observer.on_retry(agent, state, error),
                    || self.client.generate(&request),
                )
                .await;

            let response = match result {
                Ok(response) => response,
                Err(error) => {
                    if matches!(pending, Turn::ToolResults { .. }) {
                        session.append(pending);
                    }
                    warn!(agent, error = %error, "Turn failed");
                    self.observer.on_failure(agent, &error);
                    return TurnReport {
                        outcome: TurnOutcome::Fatal { error },
                        iterations,
                        requests,
                    };
                }
            };

            session.append(pending);

            let calls = response.tool_calls;
            let text = match response.text.filter(|t| !t.is_empty()) {
                Some(text) => text,
                None if calls.is_empty() => {
                    warn!(agent, "Service returned an empty response");
                    EMPTY_REPLY.to_string()
                }
                None => String::new(),
            };
            session.append(Turn::Model {
                text: (!text.is_empty()).then(|| text.clone()),
                tool_calls: calls.clone(),
            });

            if calls.is_empty() {
                info!(agent, iterations, requests, "Turn finished");
                return TurnReport {
                    outcome: TurnOutcome::Done { text },
                    iterations,
                    requests,
                };
            }

            if iterations >= self.settings.max_iterations {
                let max_iterations = self.settings.max_iterations;
                warn!(agent, max_iterations, pending_calls = calls.len(), "Tool iteration limit reached");
                self.observer.on_limit_reached(agent, max_iterations, calls.len());

                session.append(Turn::tool_results(
                    calls
                        .iter()
                        .map(|c| ToolInvocationResult::error(&c.name, NOT_EXECUTED))
                        .collect(),
                ));

                return TurnReport {
                    outcome: TurnOutcome::LimitExceeded {
                        text,
                        pending_calls: calls.len(),
                        max_iterations,
                    },
                    iterations,
                    requests,
                };
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                self.observer.on_tool_call(agent, call);
                let result = self.tools.invoke(call).await;
                self.observer.on_tool_result(agent, &result);
                results.push(result);
            }

            iterations += 1;
            pending = Turn::tool_results(results);
        }
    }
}
