use super::types::{Command, CommandOrigin};
use crate::prompt::PromptAssembler;
use crate::session::AddressingMode;
use tokio_util::sync::CancellationToken;

pub const HELP_REPLY: &str = "I understand /gpt, /mode, /flush.";
pub const GROUP_MODE_REPLY: &str = "Group Chat Context Mode";
pub const INDIVIDUAL_MODE_REPLY: &str = "Individual Chat Context Mode";
pub const UNKNOWN_REPLY: &str = "I don't know that command";
pub const FAILURE_REPLY: &str = "Looks like something went wrong.";
pub const FLUSH_REPLY: &str = "Removing cache...";
pub const STATUS_REPLY: &str = "I'm ok.";
pub const GPT_USAGE_REPLY: &str = "Usage: /gpt <text>";

/// Execute one command and produce the single reply the chat receives.
///
/// Completion failures are logged and converted to [`FAILURE_REPLY`]; nothing
/// here returns an error to the caller.
pub async fn handle_command(
    command: &Command,
    origin: CommandOrigin,
    assembler: &PromptAssembler,
    cancel: &CancellationToken,
) -> String {
    let sessions = assembler.sessions();
    match command {
        Command::Help => HELP_REPLY.to_string(),
        Command::Mode { argument } => match argument.as_str() {
            "group" => {
                sessions.set_addressing_mode(AddressingMode::Group);
                GROUP_MODE_REPLY.to_string()
            }
            "!group" => {
                sessions.set_addressing_mode(AddressingMode::Individual);
                INDIVIDUAL_MODE_REPLY.to_string()
            }
            _ => UNKNOWN_REPLY.to_string(),
        },
        Command::Gpt { text } => {
            if text.is_empty() {
                return GPT_USAGE_REPLY.to_string();
            }
            let key = sessions.resolve_key(origin.sender_id, origin.chat_id);
            tracing::info!(
                sender = origin.sender_id,
                chat = origin.chat_id,
                %key,
                mode = sessions.addressing_mode().as_str(),
                "prompt received"
            );
            match assembler.prompt(key, text, true, cancel).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(%key, "completion failed: {e}");
                    FAILURE_REPLY.to_string()
                }
            }
        }
        Command::Flush => {
            sessions.reset_all();
            FLUSH_REPLY.to_string()
        }
        Command::Status => STATUS_REPLY.to_string(),
        Command::Unknown { name } => {
            tracing::debug!(command = %name, "unrecognized command");
            UNKNOWN_REPLY.to_string()
        }
    }
}
