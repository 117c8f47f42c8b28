use super::builder::build_messages;
use crate::error::{LlmError, Result};
use crate::providers::{GenerationParams, Provider, sanitize_api_error, traits::messages_to_text};
use crate::session::{Exchange, SessionKey, SessionManager};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Turns `(session key, input text)` into a completion and commits the result
/// back into the session's history.
pub struct PromptAssembler {
    provider: Arc<dyn Provider>,
    sessions: Arc<SessionManager>,
    params: GenerationParams,
    system_prompt: String,
    timeout: Duration,
}

impl PromptAssembler {
    pub fn new(
        provider: Arc<dyn Provider>,
        sessions: Arc<SessionManager>,
        params: GenerationParams,
        system_prompt: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            sessions,
            params,
            system_prompt: system_prompt.into(),
            timeout,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Send `text` with the session's recalled context and return the reply.
    ///
    /// With `keep_history` the `(text, reply)` exchange is appended once the
    /// completion has fully succeeded. Failures, timeouts and cancellation leave
    /// the history exactly as it was. A flush that lands while the completion is
    /// in flight wins: the late exchange is dropped.
    pub async fn prompt(
        &self,
        key: SessionKey,
        text: &str,
        keep_history: bool,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let store = self.sessions.store();
        let (generation, history) = store.snapshot(key);
        let messages = build_messages(&self.system_prompt, &history, text);

        if history.is_empty() {
            tracing::debug!(%key, "first prompt for session");
        } else {
            tracing::debug!(%key, exchanges = history.len(), "prompt with recalled context");
        }
        tracing::trace!(%key, context = %messages_to_text(&messages), "assembled prompt");

        let call = self.provider.complete(&messages, &self.params);
        let response = tokio::select! {
            () = cancel.cancelled() => return Err(LlmError::Cancelled.into()),
            outcome = tokio::time::timeout(self.timeout, call) => match outcome {
                Err(_) => {
                    return Err(LlmError::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                    .into());
                }
                Ok(Err(e)) => {
                    return Err(LlmError::Request {
                        provider: self.provider.name().to_string(),
                        message: sanitize_api_error(&format!("{e:#}")),
                    }
                    .into());
                }
                Ok(Ok(response)) => response,
            },
        };

        if let Some(total) = response.total_tokens() {
            tracing::debug!(%key, tokens = total, "completion usage");
        }

        if keep_history {
            let committed =
                store.append_if_current(key, Exchange::new(text, &response.text), generation);
            if !committed {
                tracing::info!(%key, "sessions were flushed during completion; exchange dropped");
            }
            tracing::debug!(%key, exchanges = store.len(key), "session history updated");
        }

        Ok(response.text)
    }
}
