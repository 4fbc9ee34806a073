//! Progress reporting for agent activity
//!
//! The loop and the delegation graph report through an injected
//! [`AgentObserver`] instead of printing. Every method has a no-op default.

use crate::agent::retry::RetryState;
use crate::error::Error;
use crate::llm::{ToolInvocationRequest, ToolInvocationResult};

pub trait AgentObserver: Send + Sync {
    /// A request is about to be sent on behalf of `agent`.
    fn on_thinking(&self, _agent: &str) {}

    fn on_tool_call(&self, _agent: &str, _call: &ToolInvocationRequest) {}

    fn on_tool_result(&self, _agent: &str, _result: &ToolInvocationResult) {}

    /// A rate-limited request will be resent after `state.delay`.
    fn on_retry(&self, _agent: &str, _state: &RetryState, _error: &Error) {}

    fn on_limit_reached(&self, _agent: &str, _max_iterations: usize, _pending_calls: usize) {}

    fn on_delegate(&self, _from: &str, _to: &str, _task: &str) {}

    fn on_decompose(&self, _agent: &str, _tasks: &[String]) {}

    fn on_member_registered(&self, _manager: &str, _member: &str) {}

    /// A turn ended without a usable reply.
    fn on_failure(&self, _agent: &str, _error: &Error) {}
}

/// Observer that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AgentObserver for NoopObserver {}

/// Observer that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AgentObserver for TracingObserver {
    fn on_thinking(&self, agent: &str) {
        tracing::debug!(agent, "Thinking");
    }

    fn on_tool_call(&self, agent: &str, call: &ToolInvocationRequest) {
        tracing::info!(agent, tool = %call.name, args = ?call.args, "Tool call");
    }

    fn on_tool_result(&self, agent: &str, result: &ToolInvocationResult) {
        tracing::debug!(agent, tool = %result.name, is_error = result.is_error, "Tool result");
    }

    fn on_retry(&self, agent: &str, state: &RetryState, error: &Error) {
        tracing::warn!(
            agent,
            attempt = state.attempt,
            max_retries = state.max_retries,
            delay_secs = state.delay.as_secs_f64(),
            error = %error,
            "Rate limited; retrying"
        );
    }

    fn on_limit_reached(&self, agent: &str, max_iterations: usize, pending_calls: usize) {
        tracing::warn!(agent, max_iterations, pending_calls, "Tool iteration limit reached");
    }

    fn on_delegate(&self, from: &str, to: &str, task: &str) {
        tracing::info!(from, to, task, "Delegating");
    }

    fn on_decompose(&self, agent: &str, tasks: &[String]) {
        tracing::info!(agent, tasks = ?tasks, "Decomposed requirements");
    }

    fn on_member_registered(&self, manager: &str, member: &str) {
        tracing::info!(manager, member, "Team member registered");
    }

    fn on_failure(&self, agent: &str, error: &Error) {
        tracing::error!(agent, kind = error.kind(), error = %error, "Turn failed");
    }
}
