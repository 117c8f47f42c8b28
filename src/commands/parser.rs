use super::types::Command;

/// Parse a chat message into a bot command.
///
/// Returns `None` for anything that is not a slash command. A trailing
/// `@botname` on the command word is accepted and ignored, as Telegram appends
/// it in group chats.
pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let word = parts.next()?;
    let name = word.split('@').next().unwrap_or(word).to_lowercase();
    if name.is_empty() {
        return None;
    }
    let args = parts.next().unwrap_or("").trim();

    let command = match name.as_str() {
        "help" => Command::Help,
        "mode" => Command::Mode {
            argument: args.to_string(),
        },
        "gpt" => Command::Gpt {
            text: args.to_string(),
        },
        "flush" => Command::Flush,
        "status" => Command::Status,
        _ => Command::Unknown { name },
    };
    Some(command)
}
