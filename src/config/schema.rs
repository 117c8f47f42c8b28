use crate::error::ConfigError;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::providers::GenerationParams;
use crate::providers::openai::DEFAULT_OPENAI_BASE_URL;
use crate::session::SessionConfig;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_OPENAI_TOKEN: &str = "GPTELBOT_OPENAITOKEN";
pub const ENV_TELEGRAM_TOKEN: &str = "GPTELBOT_TELEGRAMTOKEN";
pub const ENV_CHAT_ID: &str = "GPTELBOT_CHATID";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was read from - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Completion-service credential (required)
    #[serde(default)]
    pub openai_token: String,
    /// Telegram bot token (required)
    #[serde(default)]
    pub telegram_token: String,
    /// Fallback reply target when an update carries no chat (required, non-zero)
    #[serde(default)]
    pub chat_id: i64,
    /// Tracing filter directive, e.g. `info` or `gptrelay=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

fn default_log_level() -> String {
    "info".into()
}

// ── Completion service ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// OpenAI-compatible API base (default: `https://api.openai.com/v1`)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_sampling")]
    pub temperature: f64,
    #[serde(default = "default_sampling")]
    pub top_p: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on one completion call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_api_base() -> String {
    DEFAULT_OPENAI_BASE_URL.into()
}

fn default_model() -> String {
    GenerationParams::default().model
}

fn default_sampling() -> f64 {
    1.0
}

fn default_max_tokens() -> u32 {
    GenerationParams::default().max_tokens
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_sampling(),
            top_p: default_sampling(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl CompletionConfig {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// HTTP client timeout: the completion deadline plus connection headroom,
    /// so the outer deadline always fires first.
    pub fn http_timeout_secs(&self) -> u64 {
        self.timeout_secs.saturating_add(5)
    }
}

// ── Telegram transport ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base (default: `https://api.telegram.org`)
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Long-poll window passed to `getUpdates`
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Delay before retrying after a failed poll
    #[serde(default = "default_poll_backoff_secs")]
    pub poll_backoff_secs: u64,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".into()
}

fn default_poll_timeout_secs() -> u64 {
    60
}

fn default_poll_backoff_secs() -> u64 {
    5
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            poll_timeout_secs: default_poll_timeout_secs(),
            poll_backoff_secs: default_poll_backoff_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            openai_token: String::new(),
            telegram_token: String::new(),
            chat_id: 0,
            log_level: default_log_level(),
            completion: CompletionConfig::default(),
            telegram: TelegramConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// `~/.gptrelay/config.toml`, or `./config.toml` when no home directory exists.
pub fn default_config_path() -> PathBuf {
    UserDirs::new().map_or_else(
        || PathBuf::from("config.toml"),
        |u| u.home_dir().join(".gptrelay").join("config.toml"),
    )
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{name} has an invalid value: {raw:?}")))
}

impl Config {
    /// Load from `path` (or the default location), then apply environment
    /// overrides and validate.
    ///
    /// A missing file is not an error: env-only deployments are supported.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map_or_else(default_config_path, Path::to_path_buf);

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(format!("{}: {e}", config_path.display())))?;
            config.config_path.clone_from(&config_path);
            config
        } else {
            if path.is_some() {
                return Err(ConfigError::Load(format!(
                    "{} does not exist",
                    config_path.display()
                )));
            }
            Self {
                config_path,
                ..Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(token) = get(ENV_OPENAI_TOKEN) {
            self.openai_token = token;
        }
        if let Some(token) = get(ENV_TELEGRAM_TOKEN) {
            self.telegram_token = token;
        }
        if let Some(raw) = get(ENV_CHAT_ID) {
            self.chat_id = parse_env(ENV_CHAT_ID, &raw)?;
        }
        if let Some(model) = get("GPTRELAY_MODEL") {
            self.completion.model = model;
        }
        if let Some(base) = get("GPTRELAY_API_BASE") {
            self.completion.api_base = base;
        }
        if let Some(raw) = get("GPTRELAY_TEMPERATURE") {
            self.completion.temperature = parse_env("GPTRELAY_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = get("GPTRELAY_TIMEOUT_SECS") {
            self.completion.timeout_secs = parse_env("GPTRELAY_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("GPTRELAY_MAX_EXCHANGES") {
            self.session.max_exchanges = parse_env("GPTRELAY_MAX_EXCHANGES", &raw)?;
        }
        if let Some(level) = get("GPTRELAY_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Refuse to run without both credentials and a target chat.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_token.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "openai_token",
                env: ENV_OPENAI_TOKEN,
            });
        }
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "telegram_token",
                env: ENV_TELEGRAM_TOKEN,
            });
        }
        if self.chat_id == 0 {
            return Err(ConfigError::Missing {
                key: "chat_id",
                env: ENV_CHAT_ID,
            });
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::Validation(format!(
                "completion.temperature must be within 0.0..=2.0, got {}",
                self.completion.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.completion.top_p) {
            return Err(ConfigError::Validation(format!(
                "completion.top_p must be within 0.0..=1.0, got {}",
                self.completion.top_p
            )));
        }
        if self.completion.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "completion.max_tokens must be positive".into(),
            ));
        }
        if self.completion.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "completion.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
