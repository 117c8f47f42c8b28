/// A bot command received from the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// `/mode <argument>`; the argument is validated by the handler.
    Mode { argument: String },
    /// `/gpt <text>`
    Gpt { text: String },
    Flush,
    Status,
    /// Any other slash command, name without the leading `/`.
    Unknown { name: String },
}

/// Who sent a command and where, as needed for session key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOrigin {
    pub sender_id: i64,
    pub chat_id: i64,
}
