use crate::channels::{Channel, ChannelMessage, TelegramChannel};
use crate::commands::{Command, CommandOrigin, handle_command, parse_command};
use crate::config::Config;
use crate::error::TransportError;
use crate::prompt::PromptAssembler;
use crate::providers::{OpenAiProvider, Provider};
use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Inbound queue depth between the poller and the dispatcher.
const INBOUND_QUEUE: usize = 100;

/// Routes chat commands to their handlers and sends exactly one reply per
/// command back over the channel.
pub struct Relay {
    channel: Arc<dyn Channel>,
    assembler: PromptAssembler,
    fallback_chat_id: i64,
}

impl Relay {
    pub fn new(channel: Arc<dyn Channel>, assembler: PromptAssembler, fallback_chat_id: i64) -> Self {
        Self {
            channel,
            assembler,
            fallback_chat_id,
        }
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    /// Produce the reply for one inbound message, or `None` when the message
    /// is not a command.
    pub async fn handle_message(
        &self,
        msg: &ChannelMessage,
        cancel: &CancellationToken,
    ) -> Option<(i64, String)> {
        if !msg.is_command {
            tracing::trace!(sender = msg.sender_id, "ignoring non-command message");
            return None;
        }

        let command = parse_command(&msg.text).unwrap_or_else(|| Command::Unknown {
            name: msg.text.split_whitespace().next().unwrap_or_default().to_string(),
        });
        let chat_id = if msg.chat_id == 0 {
            self.fallback_chat_id
        } else {
            msg.chat_id
        };
        let origin = CommandOrigin {
            sender_id: msg.sender_id,
            chat_id,
        };

        tracing::debug!(
            message_id = %msg.id,
            sent_at = msg.timestamp,
            sender = msg.sender_id,
            chat = chat_id,
            command = ?command,
            "dispatching command"
        );
        let reply = handle_command(&command, origin, &self.assembler, cancel).await;
        Some((chat_id, reply))
    }

    /// Drain `rx` one message at a time until it closes or `cancel` fires.
    ///
    /// A failed send is logged and only loses that reply.
    pub async fn process(&self, mut rx: mpsc::Receiver<ChannelMessage>, cancel: &CancellationToken) {
        loop {
            let msg = tokio::select! {
                () = cancel.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };

            let Some((chat_id, reply)) = self.handle_message(&msg, cancel).await else {
                continue;
            };
            if let Err(e) = self.channel.send(&reply, chat_id).await {
                let err = TransportError::Send {
                    channel: self.channel.name().to_string(),
                    message: format!("{e:#}"),
                };
                tracing::warn!(chat = chat_id, "{err}");
            }
        }
        tracing::info!("relay dispatcher stopped");
    }
}

/// Start the relay and block until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let provider = Arc::new(OpenAiProvider::with_base_url(
        Some(&config.openai_token),
        &config.completion.api_base,
        config.completion.http_timeout_secs(),
    ));
    if let Err(e) = provider.warmup().await {
        tracing::warn!("completion endpoint warmup failed: {e:#}");
    }

    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(
        config.telegram_token.clone(),
        &config.telegram,
    ));
    let account = channel
        .identify()
        .await
        .map_err(|e| TransportError::Connection {
            channel: channel.name().to_string(),
            message: format!("{e:#}"),
        })?;
    tracing::info!(account = %account, "authorized on account");

    let sessions = Arc::new(SessionManager::new(config.session.clone()));
    let assembler = PromptAssembler::new(
        provider,
        sessions,
        config.completion.generation_params(),
        config.completion.system_prompt.clone(),
        config.completion.timeout(),
    );
    let relay = Relay::new(Arc::clone(&channel), assembler, config.chat_id);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
            }
            cancel.cancel();
        });
    }

    let (tx, rx) = mpsc::channel(INBOUND_QUEUE);
    let listener = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        tokio::spawn(async move { channel.listen(tx, cancel).await })
    };

    relay.process(rx, &cancel).await;
    cancel.cancel();

    match listener.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.context("channel listener failed")),
        Err(e) => Err(anyhow::anyhow!("channel listener panicked: {e}")),
    }
}
