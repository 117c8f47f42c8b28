use super::TelegramChannel;
use crate::channels::traits::{Channel, ChannelMessage};
use crate::providers::sanitize_api_error;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

impl TelegramChannel {
    /// Unwrap the Bot API envelope `{"ok": bool, "result": ..., "description": ...}`.
    async fn call(&self, method: &str, body: &Value) -> anyhow::Result<Value> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!(sanitize_api_error(&e.to_string())))
            .with_context(|| format!("Telegram {method} request failed"))?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .with_context(|| format!("Telegram {method} returned invalid JSON ({status})"))?;

        if data.get("ok").and_then(Value::as_bool) != Some(true) {
            let description = data
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("no description");
            anyhow::bail!(
                "Telegram {method} failed ({status}): {}",
                sanitize_api_error(description)
            );
        }

        Ok(data.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn backoff(&self, cancel: &CancellationToken) {
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(self.poll_backoff) => {}
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn identify(&self) -> anyhow::Result<String> {
        let me = self.call("getMe", &serde_json::json!({})).await?;
        me.get("username")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Telegram getMe response has no username"))
    }

    async fn send(&self, message: &str, chat_id: i64) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": message,
        });
        self.call("sendMessage", &body).await?;
        Ok(())
    }

    async fn listen(
        &self,
        tx: tokio::sync::mpsc::Sender<ChannelMessage>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let mut offset: i64 = 0;

        tracing::info!("Telegram channel listening for messages...");

        loop {
            let body = serde_json::json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message"]
            });

            let result = tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                result = self.call("getUpdates", &body) => result,
            };

            let updates = match result {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("Telegram poll error: {e:#}");
                    self.backoff(&cancel).await;
                    continue;
                }
            };

            let Some(updates) = updates.as_array() else {
                continue;
            };

            for update in updates {
                // Advance offset past this update
                if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                    offset = uid + 1;
                }

                let Some(msg) = Self::parse_update(update) else {
                    continue;
                };

                tracing::debug!(
                    sender = msg.sender_id,
                    username = msg.sender_name.as_deref().unwrap_or("unknown"),
                    chat = msg.chat_id,
                    "Telegram message received"
                );

                if tx.send(msg).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}
