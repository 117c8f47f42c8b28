pub mod handler;

use crate::channels::traits::ChannelMessage;
use crate::config::TelegramConfig;
use crate::providers::http_client::build_http_client;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;


/// Telegram channel — long-polls the Bot API for updates
pub struct TelegramChannel {
    bot_token: String,
    api_base: String,
    poll_timeout_secs: u64,
    poll_backoff: Duration,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String, config: &TelegramConfig) -> Self {
        Self {
            bot_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            poll_timeout_secs: config.poll_timeout_secs,
            poll_backoff: Duration::from_secs(config.poll_backoff_secs),
            // Leave headroom over the server-side long-poll window.
            client: build_http_client(config.poll_timeout_secs.saturating_add(15)),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    /// Extract a text message from one `getUpdates` entry.
    ///
    /// Non-message updates (edits, callbacks, channel posts) and messages
    /// without text yield `None`.
    fn parse_update(update: &Value) -> Option<ChannelMessage> {
        let message = update.get("message")?;
        let text = message.get("text").and_then(Value::as_str)?;

        let from = message.get("from");
        let sender_id = from
            .and_then(|f| f.get("id"))
            .and_then(Value::as_i64)
            .unwrap_or_default();
        let sender_name = from
            .and_then(|f| f.get("username"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let chat_id = message
            .get("chat")
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64)
            .unwrap_or_default();

        let timestamp = message
            .get("date")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
            });

        Some(ChannelMessage {
            id: Uuid::new_v4().to_string(),
            sender_id,
            sender_name,
            chat_id,
            text: text.to_string(),
            is_command: Self::is_command(message, text),
            timestamp,
        })
    }

    /// A message is a command when its first entity is a `bot_command` at
    /// offset 0. Clients that omit entities fall back to a leading slash.
    fn is_command(message: &Value, text: &str) -> bool {
        match message
            .get("entities")
            .and_then(Value::as_array)
            .and_then(|entities| entities.first())
        {
            Some(entity) => {
                entity.get("type").and_then(Value::as_str) == Some("bot_command")
                    && entity.get("offset").and_then(Value::as_i64) == Some(0)
            }
            None => text.starts_with('/'),
        }
    }
}
