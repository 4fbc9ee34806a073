//! Interactive chat mode and one-shot execution
//!
//! Every line goes to the Manager, which decomposes and delegates as it sees fit.

use std::borrow::Cow;
use std::time::Duration;

use crew_core::llm::Turn;
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, EditCommand, Emacs, KeyCode, KeyModifiers,
    Keybindings, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, Span, Suggestion,
};
use tracing::info;

use crate::team::Team;

/// Pause after a failed turn before the next line is read
const FAILURE_COOLDOWN: Duration = Duration::from_secs(2);

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/team", "Show the team and its tools"),
    ("/history", "Show the Manager's conversation"),
    ("/exit", "Quit"),
    ("/quit", "Quit"),
];

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("You> ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// What the chat loop should do with a line
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Quit,
    Command(&'a str),
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let input = line.trim();
    if input.is_empty() {
        return Input::Skip;
    }

    let lower = input.to_lowercase();
    match lower.as_str() {
        "exit" | "quit" | "/exit" | "/quit" | "/q" => Input::Quit,
        _ if input.starts_with('/') => Input::Command(input),
        _ => Input::Message(input),
    }
}

/// Run the interactive chat loop until the operator quits.
pub async fn run_chat(team: &Team) -> anyhow::Result<()> {
    info!("Starting chat mode");
    print_welcome(team);

    let mut keybindings = default_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![EditCommand::InsertChar('/'), EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );
    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => match classify(&line) {
                Input::Skip => continue,
                Input::Quit => break,
                Input::Command(command) => handle_command(command, team).await,
                Input::Message(message) => {
                    let (report, reply) = team.ask(message).await;
                    if report.outcome.is_fatal() {
                        eprintln!("\n{}\n", Color::Red.paint(reply));
                        tokio::time::sleep(FAILURE_COOLDOWN).await;
                    } else {
                        println!("\n{}\n{}\n", Color::Green.bold().paint("Manager>"), reply);
                    }
                }
            },
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => break,
            Err(err) => {
                eprintln!("\nInput error: {}\n", err);
                break;
            }
        }
    }

    println!("\nGoodbye.\n");
    Ok(())
}

/// Run a single Manager turn and print the reply.
///
/// Returns `false` when the turn failed without a usable reply.
pub async fn run_execute(team: &Team, prompt: &str) -> anyhow::Result<bool> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        anyhow::bail!("Prompt is empty");
    }

    info!("Executing one-shot prompt");
    let (report, reply) = team.ask(prompt).await;

    if report.outcome.is_fatal() {
        eprintln!("{}", reply);
        Ok(false)
    } else {
        println!("{}", reply);
        Ok(true)
    }
}

fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('c'), ReedlineEvent::CtrlC);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::CtrlD);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

async fn handle_command(input: &str, team: &Team) {
    match input.to_lowercase().as_str() {
        "/help" | "/?" => print_help(),
        "/team" => print_team(team).await,
        "/history" => print_history(&team.manager().node().transcript().await),
        _ => eprintln!("\nUnknown command: {}. Type /help for the list.\n", input),
    }
}

fn print_welcome(team: &Team) {
    println!();
    println!("{}", Color::Cyan.bold().paint("crew: Manager, Architect and Coder"));
    println!("Model: {}", team.manager().node().identity().model());
    println!("Project root: {}", team.root().path().display());
    println!("Type a request and press Enter. Commands: /help, /team, /history, /exit");
    println!();
}

fn print_help() {
    println!();
    println!("Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {:<10} {}", cmd, desc);
    }
    println!("  'exit' or 'quit' also end the session, as does Ctrl-D.");
    println!();
}

async fn print_team(team: &Team) {
    let manager = team.manager().node();
    println!();
    println!("{} (tools: {})", manager.name(), manager.tool_names().join(", "));
    for member in team.members() {
        println!(
            "  {} (tools: {}, {} turns)",
            member.name(),
            member.tool_names().join(", "),
            member.turn_count().await
        );
    }
    println!();
}

fn print_history(turns: &[Turn]) {
    println!();
    println!("Conversation ({} entries):", turns.len());
    println!("{}", "-".repeat(50));

    for (i, turn) in turns.iter().enumerate() {
        let text = turn.text_content().replace('\n', " ");
        let preview = if text.chars().count() > 100 {
            format!("{}...", text.chars().take(100).collect::<String>())
        } else {
            text
        };
        println!("{}. {}: {}", i + 1, turn.label(), preview);
    }

    println!("{}", "-".repeat(50));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("   "), Input::Skip);
        assert_eq!(classify("EXIT"), Input::Quit);
        assert_eq!(classify(" quit "), Input::Quit);
        assert_eq!(classify("/Quit"), Input::Quit);
        assert_eq!(classify("/team"), Input::Command("/team"));
        assert_eq!(classify(" build a todo app "), Input::Message("build a todo app"));
        assert_eq!(classify("exit the loop early"), Input::Message("exit the loop early"));
    }

    #[test]
    fn test_completer_filters_by_prefix() {
        let mut completer = CommandCompleter::new();
        let values: Vec<String> = completer
            .complete("/h", 2)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["/help", "/history"]);
        assert!(completer.complete("hello", 5).is_empty());
    }
}
