use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `gptrelay`.
///
/// Each subsystem defines its own error variant. The dispatcher matches on
/// these to decide what the chat sees; plumbing code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("missing required setting `{key}` (set {env} or edit config.toml)")]
    Missing { key: &'static str, env: &'static str },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("completion timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("completion cancelled")]
    Cancelled,
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel {channel} connection failed: {message}")]
    Connection { channel: String, message: String },

    #[error("channel {channel} send failed: {message}")]
    Send { channel: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_missing_names_env_var() {
        let err = RelayError::Config(ConfigError::Missing {
            key: "chat_id",
            env: "GPTELBOT_CHATID",
        });
        let rendered = err.to_string();
        assert!(rendered.contains("chat_id"));
        assert!(rendered.contains("GPTELBOT_CHATID"));
    }

    #[test]
    fn llm_timeout_displays_seconds() {
        let err = RelayError::Llm(LlmError::Timeout { timeout_secs: 30 });
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let relay_err: RelayError = anyhow_err.into();
        assert!(relay_err.to_string().contains("something went wrong"));
    }

    #[test]
    fn transport_send_displays_channel() {
        let err = RelayError::Transport(TransportError::Send {
            channel: "telegram".into(),
            message: "403 Forbidden".into(),
        });
        assert!(err.to_string().contains("telegram"));
        assert!(err.to_string().contains("403"));
    }
}
