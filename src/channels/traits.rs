use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A message received from a channel.
///
/// `sender_id` identifies the user; `chat_id` the conversation it was posted in
/// (equal to `sender_id` in a private chat).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: String,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    /// `0` when the platform did not say.
    pub chat_id: i64,
    pub text: String,
    /// Whether the platform flagged the text as a bot command.
    pub is_command: bool,
    pub timestamp: u64,
}

/// Core channel trait — implement for any messaging platform
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Resolve the bot account this channel is authenticated as.
    ///
    /// Called once at startup; failure means the channel cannot be used.
    async fn identify(&self) -> anyhow::Result<String>;

    /// Send a text message to a chat
    async fn send(&self, message: &str, chat_id: i64) -> anyhow::Result<()>;

    /// Deliver incoming messages until `cancel` fires or the receiver is dropped
    async fn listen(
        &self,
        tx: tokio::sync::mpsc::Sender<ChannelMessage>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()>;
}
