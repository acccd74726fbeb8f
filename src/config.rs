//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the file named by `AAS_AGENT_CONFIG`), then applies
//! `AAS_AGENT_WORK_DIR` and `AAS_AGENT_LOG_LEVEL` overrides. Credentials
//! (`OPENAI_API_KEY`, `TELEGRAM_BOT_TOKEN`) come from the environment only.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
}

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub enabled: bool,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub telegram: TelegramConfig,
}

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openai"` or `"dummy"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Conversation agent configuration (`[agent]`).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum number of user/assistant messages kept per session.
    pub history_cap: usize,
    /// Directory holding `aas_agent.md` (system prompt template).
    pub prompts_dir: PathBuf,
}

/// AAS persistence configuration (`[aas]`).
#[derive(Debug, Clone)]
pub struct AasConfig {
    /// Directory that `save_aas` / `load_aas` file names resolve into.
    pub data_dir: PathBuf,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    /// Working directory for persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Optional log file; stderr when absent.
    pub log_file: Option<PathBuf>,
    pub comms: CommsConfig,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub aas: AasConfig,
    /// From `OPENAI_API_KEY`. Never sourced from TOML.
    pub llm_api_key: Option<String>,
    /// From `TELEGRAM_BOT_TOKEN`. Never sourced from TOML.
    pub telegram_token: Option<String>,
}

impl Config {
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    /// Telegram is only loaded when the binary was built with it.
    pub fn comms_telegram_should_load(&self) -> bool {
        cfg!(feature = "channel-telegram") && self.comms.telegram.enabled
    }

    /// Check that every enabled component has the credentials it needs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.llm.provider == "openai" && self.llm_api_key.is_none() {
            return Err(AppError::Config(
                "OPENAI_API_KEY environment variable not set (export OPENAI_API_KEY='your-key-here')"
                    .into(),
            ));
        }
        if self.comms_telegram_should_load() && self.telegram_token.is_none() {
            return Err(AppError::Config(
                "TELEGRAM_BOT_TOKEN environment variable not set (export TELEGRAM_BOT_TOKEN='your-token-here')"
                    .into(),
            ));
        }
        if !self.comms_telegram_should_load() && !self.comms_pty_should_load() {
            return Err(AppError::Config("no comms channel enabled".into()));
        }
        if self.agent.history_cap == 0 {
            return Err(AppError::Config("agent.history_cap must be at least 1".into()));
        }
        Ok(())
    }
}

/// Values that come from the environment rather than TOML.
/// Tests pass these directly instead of mutating env vars.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub work_dir: Option<String>,
    pub log_level: Option<String>,
    pub llm_api_key: Option<String>,
    pub telegram_token: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            work_dir: env::var("AAS_AGENT_WORK_DIR").ok(),
            log_level: env::var("AAS_AGENT_LOG_LEVEL").ok(),
            llm_api_key: non_empty_var("OPENAI_API_KEY"),
            telegram_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ── Raw TOML shape ──────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    bot: RawBot,
    #[serde(default)]
    comms: RawComms,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    agent: RawAgent,
    #[serde(default)]
    aas: RawAas,
}

#[derive(Deserialize)]
struct RawBot {
    #[serde(default = "default_bot_name")]
    name: String,
    #[serde(default = "default_work_dir")]
    work_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

impl Default for RawBot {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            work_dir: default_work_dir(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawComms {
    #[serde(default)]
    pty: RawPty,
    #[serde(default)]
    telegram: RawTelegram,
}

#[derive(Deserialize, Default)]
struct RawPty {
    /// Defaults to `false`: the console is for local runs.
    #[serde(default)]
    enabled: bool,
}

#[derive(Deserialize)]
struct RawTelegram {
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for RawTelegram {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawAgent {
    #[serde(default = "default_history_cap")]
    history_cap: usize,
    #[serde(default = "default_prompts_dir")]
    prompts_dir: String,
}

impl Default for RawAgent {
    fn default() -> Self {
        Self { history_cap: default_history_cap(), prompts_dir: default_prompts_dir() }
    }
}

#[derive(Deserialize)]
struct RawAas {
    #[serde(default = "default_data_dir")]
    data_dir: String,
}

impl Default for RawAas {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

fn default_bot_name() -> String { "aas-agent".to_string() }
fn default_work_dir() -> String { "~/.aas-agent".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_history_cap() -> usize { 20 }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_data_dir() -> String { "aas".to_string() }

fn default_true() -> bool {
    true
}

// ── Loading ─────────────────────────────────────────────────────────────────

/// Load config from `AAS_AGENT_CONFIG` or `config/default.toml`, then apply
/// env-var overrides.
///
/// An explicitly named file must exist. When the default file is absent the
/// built-in defaults are used, so the binary runs with env vars alone.
pub fn load() -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();
    match env::var("AAS_AGENT_CONFIG") {
        Ok(path) => load_from(Path::new(&path), overrides),
        Err(_) => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                load_from(path, overrides)
            } else {
                Ok(resolve(RawConfig::default(), overrides))
            }
        }
    }
}

/// Load from an explicit path with explicit overrides.
pub fn load_from(path: &Path, overrides: EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;
    Ok(resolve(parsed, overrides))
}

fn resolve(parsed: RawConfig, overrides: EnvOverrides) -> Config {
    let b = parsed.bot;
    let work_dir = expand_home(overrides.work_dir.as_deref().unwrap_or(&b.work_dir));
    let log_level = overrides.log_level.unwrap_or(b.log_level);
    let log_file = b.log_file.map(|p| relative_to(&work_dir, &p));
    let data_dir = relative_to(&work_dir, &parsed.aas.data_dir);

    Config {
        bot_name: b.name,
        work_dir,
        log_level,
        log_file,
        comms: CommsConfig {
            pty: PtyConfig { enabled: parsed.comms.pty.enabled },
            telegram: TelegramConfig { enabled: parsed.comms.telegram.enabled },
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        agent: AgentConfig {
            history_cap: parsed.agent.history_cap,
            prompts_dir: expand_home(&parsed.agent.prompts_dir),
        },
        aas: AasConfig { data_dir },
        llm_api_key: overrides.llm_api_key,
        telegram_token: overrides.telegram_token,
    }
}

/// Absolute (or `~`) paths are kept; relative ones are joined onto `base`.
fn relative_to(base: &Path, path: &str) -> PathBuf {
    let p = expand_home(path);
    if p.is_absolute() { p } else { base.join(p) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for tests — dummy LLM, console only, no credentials.
impl Config {
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            bot_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            log_file: None,
            comms: CommsConfig {
                pty: PtyConfig { enabled: true },
                telegram: TelegramConfig { enabled: false },
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            agent: AgentConfig {
                history_cap: default_history_cap(),
                prompts_dir: work_dir.join("prompts"),
            },
            aas: AasConfig { data_dir: work_dir.join("aas") },
            llm_api_key: None,
            telegram_token: None,
        }
    }
}
