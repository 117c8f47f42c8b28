use super::response::{GenerationParams, ProviderMessage, ProviderResponse};
use async_trait::async_trait;

/// Render role-tagged messages as plain text, one `role: content` line each.
///
/// Used for debug logging of the exact context a prompt was sent with.
pub fn messages_to_text(messages: &[ProviderMessage]) -> String {
    messages
        .iter()
        .map(|msg| format!("{}: {}", msg.role.as_str(), msg.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chat completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider label for logs and errors.
    fn name(&self) -> &str;

    /// Submit an ordered, role-tagged message list and return the generated text.
    async fn complete(
        &self,
        messages: &[ProviderMessage],
        params: &GenerationParams,
    ) -> anyhow::Result<ProviderResponse>;

    /// Warm up the HTTP connection pool (TLS handshake, DNS, HTTP/2 setup).
    /// Default implementation is a no-op; providers with HTTP clients should override.
    async fn warmup(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
