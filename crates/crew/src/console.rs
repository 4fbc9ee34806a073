//! Console progress output for agent activity

use crew_core::agent::RetryState;
use crew_core::llm::{ToolInvocationRequest, ToolInvocationResult};
use crew_core::{AgentObserver, Error};
use nu_ansi_term::{Color, Style};

const PREVIEW_CHARS: usize = 80;

/// Prints agent progress to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver {
    verbose: bool,
}

impl ConsoleObserver {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

fn agent_label(agent: &str) -> String {
    Color::Cyan.bold().paint(format!("[{}]", agent)).to_string()
}

impl AgentObserver for ConsoleObserver {
    fn on_thinking(&self, agent: &str) {
        println!(
            "{} {}",
            agent_label(agent),
            Style::new().dimmed().paint(format!("{} is thinking...", agent))
        );
    }

    fn on_tool_call(&self, agent: &str, call: &ToolInvocationRequest) {
        let args = render_args(call);
        println!(
            "{} {} {}",
            agent_label(agent),
            Color::Yellow.paint(format!("-> {}", call.name)),
            Style::new().dimmed().paint(preview(&args))
        );
    }

    fn on_tool_result(&self, agent: &str, result: &ToolInvocationResult) {
        if result.is_error {
            println!(
                "{} {}",
                agent_label(agent),
                Color::Red.paint(format!("{} failed: {}", result.name, preview(&result.payload)))
            );
        } else if self.verbose {
            println!(
                "{} {}",
                agent_label(agent),
                Style::new().dimmed().paint(format!("{}: {}", result.name, preview(&result.payload)))
            );
        }
    }

    fn on_retry(&self, agent: &str, state: &RetryState, _error: &Error) {
        println!(
            "{} {}",
            agent_label(agent),
            Color::Yellow.paint(format!(
                "Rate limited. Retrying in {}s ({}/{})",
                state.delay.as_secs_f64(),
                state.attempt,
                state.max_retries
            ))
        );
    }

    fn on_limit_reached(&self, agent: &str, max_iterations: usize, pending_calls: usize) {
        println!(
            "{} {}",
            agent_label(agent),
            Color::Yellow.paint(format!(
                "Tool iteration limit ({}) reached, {} call(s) skipped",
                max_iterations, pending_calls
            ))
        );
    }

    fn on_delegate(&self, from: &str, to: &str, task: &str) {
        println!(
            "{} {} {}",
            agent_label(from),
            Color::Green.bold().paint(format!("delegates to {}:", to)),
            preview(task)
        );
    }

    fn on_decompose(&self, agent: &str, tasks: &[String]) {
        println!("{} {}", agent_label(agent), Color::Green.paint("task plan:"));
        for (i, task) in tasks.iter().enumerate() {
            println!("    {}. {}", i + 1, task);
        }
    }

    fn on_failure(&self, agent: &str, error: &Error) {
        println!(
            "{} {}",
            agent_label(agent),
            Color::Red.bold().paint(format!("{} error", error.kind()))
        );
    }
}

fn render_args(call: &ToolInvocationRequest) -> String {
    call.args
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(s) => format!("{}={}", key, s),
            None => format!("{}={}", key, value),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
