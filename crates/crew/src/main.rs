//! crew: a Manager, an Architect and a Coder working on one project
//!
//! Usage:
//!   crew                    - Start interactive chat with the Manager
//!   crew -e "<prompt>"      - Run one request and exit
//!   crew --list-models      - List models available to the API key
//!   crew --ping             - Check the connection to the configured model
//!   crew --help             - Show help

mod cli;
mod console;
mod team;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use crew_core::llm::GenerateRequest;
use crew_core::{Config, GeminiClient, LlmClient};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;
use crate::team::Team;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Interactive chat loop
    Chat,
    /// One-shot request
    Execute(String),
    ListModels,
    Ping,
    Help,
    Version,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    mode: RunMode,
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n", message);
            print_help();
            return Ok(ExitCode::from(2));
        }
    };

    match args.mode {
        RunMode::Help => {
            print_help();
            return Ok(ExitCode::SUCCESS);
        }
        RunMode::Version => {
            println!("crew {}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    // Load .env first so RUST_LOG set there reaches the filter
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout belongs to the console
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(model = %config.llm.model, "Starting crew");

    match args.mode {
        RunMode::ListModels => list_models(&config).await,
        RunMode::Ping => ping(&config).await,
        RunMode::Execute(prompt) => {
            let team = Team::assemble(&config, Arc::new(ConsoleObserver::new(args.verbose))).await?;
            if cli::run_execute(&team, &prompt).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        RunMode::Chat => {
            let team = Team::assemble(&config, Arc::new(ConsoleObserver::new(args.verbose))).await?;
            cli::run_chat(&team).await?;
            Ok(ExitCode::SUCCESS)
        }
        RunMode::Help | RunMode::Version => Ok(ExitCode::SUCCESS),
    }
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut mode = RunMode::Chat;
    let mut verbose = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--execute" | "-e" => {
                let prompt = args
                    .next()
                    .ok_or_else(|| format!("{} requires a prompt", arg))?;
                mode = RunMode::Execute(prompt);
            }
            "--list-models" => mode = RunMode::ListModels,
            "--ping" => mode = RunMode::Ping,
            "--verbose" => verbose = true,
            "--help" | "-h" => return Ok(Args { mode: RunMode::Help, verbose }),
            "--version" | "-V" => return Ok(Args { mode: RunMode::Version, verbose }),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(Args { mode, verbose })
}

fn print_help() {
    println!("crew - a Manager, an Architect and a Coder on Gemini");
    println!();
    println!("Usage:");
    println!("  crew                     Start interactive chat with the Manager");
    println!("  crew -e, --execute TEXT  Send one request, print the reply and exit");
    println!("  crew --list-models       List models available to the API key");
    println!("  crew --ping              Check the connection to the configured model");
    println!("  crew --verbose           Also print successful tool results");
    println!("  crew --help              Show this help message");
    println!("  crew --version           Show version");
    println!();
    println!("Environment Variables (also read from .env and crew.toml):");
    println!("  GEMINI_API_KEY             API key (required)");
    println!("  GEMINI_MODEL_NAME          Model name (default: gemini-1.5-flash)");
    println!("  GEMINI_BASE_URL            Custom API endpoint");
    println!("  CREW_MAX_ITERATIONS        Tool round-trips per turn (default: 10)");
    println!("  CREW_REQUEST_INTERVAL_MS   Wait before each request (default: 2000)");
    println!("  CREW_REPLY_LANGUAGE        Language agents reply in (default: Japanese)");
    println!("  CREW_MAX_RETRIES           Retries on rate limiting (default: 3)");
    println!("  CREW_RETRY_DELAY_SECS      First retry delay (default: 5)");
    println!("  CREW_WORKSPACE_ROOT        Directory the tools work in (default: .)");
    println!("  CREW_COMMAND_TIMEOUT_SECS  Timeout for run_command (default: 30)");
    println!("  RUST_LOG                   Log filter (default: warn)");
}

async fn list_models(config: &Config) -> anyhow::Result<ExitCode> {
    let client = GeminiClient::new(config.llm_config())?;

    match client.list_models().await {
        Ok(models) => {
            println!("Available models ({}):", models.len());
            for model in models {
                match model.display_name {
                    Some(display) => println!("  {} ({})", model.name, display),
                    None => println!("  {}", model.name),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Failed to list models: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn ping(config: &Config) -> anyhow::Result<ExitCode> {
    let client = GeminiClient::new(config.llm_config())?;
    println!("Pinging {} at {}...", client.model(), client.base_url());

    let request = GenerateRequest::one_shot(client.model(), None, "Reply with the single word: pong");
    match client.generate(&request).await {
        Ok(response) => {
            println!("OK: {}", response.text.unwrap_or_default().trim());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Connection check failed: {}", e);
            if let Some(hint) = e.hint(client.model()) {
                eprintln!("Hint: {}", hint);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
