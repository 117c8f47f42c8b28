use crate::providers::ProviderMessage;
use crate::session::Exchange;

/// Default system instruction: sets the assistant's role and the meaning of the
/// `user` and `assistant` labels used in recalled history.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a smart assistant who is good at reviewing \
conversations. In this conversation, \"user\" refers to me and \"assistant\" refers to you.";

const HISTORY_PREFIX: &str = "Our chat history: ";

/// Join stored exchanges in insertion order, one record per line.
pub fn render_history(history: &[Exchange]) -> String {
    history
        .iter()
        .map(Exchange::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the message sequence for one prompt.
///
/// Without history the sequence is `[system, user]`. With history every prior
/// exchange is folded into a single assistant-role message placed between the
/// two: `[system, assistant(history), user]`.
pub fn build_messages(system_prompt: &str, history: &[Exchange], input: &str) -> Vec<ProviderMessage> {
    if history.is_empty() {
        return vec![
            ProviderMessage::system(system_prompt),
            ProviderMessage::user(input),
        ];
    }

    vec![
        ProviderMessage::system(system_prompt),
        ProviderMessage::assistant(format!("{HISTORY_PREFIX}{}", render_history(history))),
        ProviderMessage::user(input),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MessageRole;

    #[test]
    fn empty_history_yields_system_then_user() {
        let messages = build_messages(DEFAULT_SYSTEM_PROMPT, &[], "hello");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[1], ProviderMessage::user("hello"));
    }

    #[test]
    fn history_is_folded_under_assistant_role() {
        let history = vec![
            Exchange::new("first", "one"),
            Exchange::new("second", "two"),
        ];
        let messages = build_messages("sys", &history, "third");

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ProviderMessage::system("sys"));
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(
            messages[1].content,
            "Our chat history: user: first assistant: one\n\nuser: second assistant: two\n"
        );
        assert_eq!(messages[2], ProviderMessage::user("third"));
    }

    #[test]
    fn history_keeps_append_order() {
        let history: Vec<_> = (0..5)
            .map(|i| Exchange::new(&format!("q{i}"), &format!("a{i}")))
            .collect();
        let context = &build_messages("sys", &history, "next")[1].content;

        let positions: Vec<_> = (0..5)
            .map(|i| context.find(&format!("user: q{i} ")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn render_history_of_nothing_is_empty() {
        assert_eq!(render_history(&[]), "");
    }
}
