use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one conversational thread.
///
/// Depending on the active [`AddressingMode`] this is either the Telegram user
/// id of the sender or the id of the chat the command arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(pub i64);

impl From<i64> for SessionKey {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which identity a session key is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingMode {
    /// One thread per sender, shared across every chat they talk in.
    #[default]
    Individual,
    /// One thread per chat, shared by everyone in it.
    Group,
}

impl AddressingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Group => "group",
        }
    }
}

/// One user input paired with the assistant reply it produced.
///
/// Stored as the pre-rendered record that is later replayed verbatim as
/// recalled context, not as structured fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange(String);

impl Exchange {
    pub fn new(input: &str, reply: &str) -> Self {
        Self(format!("user: {input} assistant: {reply}\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered exchanges of one session, oldest first.
pub type SessionHistory = Vec<Exchange>;

/// Tunables for the session table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum exchanges retained per session; `0` keeps everything.
    #[serde(default)]
    pub max_exchanges: usize,
}
