//! Configuration management
//!
//! Settings are read with the following priority:
//! 1. Environment variables
//! 2. `crew.toml` in the working directory
//! 3. Defaults
//!
//! `${VAR_NAME}` references inside the TOML file are expanded from the
//! environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "crew.toml";

/// LLM service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (required)
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL (optional, for proxies and tests)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

/// Agent turn settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool round-trips per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Minimum wait before every outbound request
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,

    /// Language every agent is told to reply in
    #[serde(default = "default_reply_language")]
    pub reply_language: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            request_interval_ms: default_request_interval_ms(),
            reply_language: default_reply_language(),
        }
    }
}

impl AgentConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

/// Rate-limit retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_secs: default_initial_delay_secs(),
        }
    }
}

/// Scoped root for file and command tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,

    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

impl WorkspaceConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_iterations() -> usize {
    10
}

fn default_request_interval_ms() -> u64 {
    2000
}

fn default_reply_language() -> String {
    "Japanese".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_command_timeout_secs() -> u64 {
    30
}

/// Main configuration for crew
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references with environment values.
    ///
    /// Unset variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;

        Ok(cfg)
    }

    /// Parse TOML text (after `${VAR}` expansion) without env overrides.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        toml::from_str(&expanded).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load from `./crew.toml` if present, otherwise from the environment.
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults plus whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides(lookup);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Override fields from environment-style variables.
    ///
    /// Empty values are ignored so a blank `GEMINI_MODEL_NAME=` in `.env`
    /// does not erase the file or default setting.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = get("GEMINI_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(model) = get("GEMINI_MODEL_NAME") {
            self.llm.model = model;
        }
        if let Some(base_url) = get("GEMINI_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        if let Some(n) = get("CREW_MAX_ITERATIONS").and_then(|v| v.parse().ok()) {
            self.agent.max_iterations = n;
        }
        if let Some(ms) = get("CREW_REQUEST_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.agent.request_interval_ms = ms;
        }
        if let Some(language) = get("CREW_REPLY_LANGUAGE") {
            self.agent.reply_language = language;
        }

        if let Some(n) = get("CREW_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            self.retry.max_retries = n;
        }
        if let Some(secs) = get("CREW_RETRY_DELAY_SECS").and_then(|v| v.parse().ok()) {
            self.retry.initial_delay_secs = secs;
        }

        if let Some(root) = get("CREW_WORKSPACE_ROOT") {
            self.workspace.root = PathBuf::from(root);
        }
        if let Some(secs) = get("CREW_COMMAND_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.workspace.command_timeout_secs = secs;
        }
    }

    /// Reject configurations that cannot talk to the service.
    pub fn validate(&self) -> crate::Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY environment variable is not set.".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the effective LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }
}
