use crate::providers::{
    GenerationParams, ProviderMessage, ProviderResponse, http_client::build_http_client,
    traits::Provider,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<&str>) -> Self {
        Self::with_base_url(api_key, DEFAULT_OPENAI_BASE_URL, 120)
    }

    /// Point the provider at any OpenAI-compatible endpoint.
    pub fn with_base_url(api_key: Option<&str>, base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            client: build_http_client(timeout_secs),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(
        messages: &'a [ProviderMessage],
        params: &'a GenerationParams,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &params.model,
            messages: messages
                .iter()
                .map(|m| Message {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
        }
    }

    fn extract_text(chat_response: &ChatResponse) -> anyhow::Result<String> {
        chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))
    }

    async fn call_api(&self, request: &ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let auth_header = self.cached_auth_header.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "OpenAI API key not set. Set GPTELBOT_OPENAITOKEN or edit config.toml."
            )
        })?;

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", auth_header)
            .json(request)
            .send()
            .await
            .context("OpenAI request failed")?;

        if !response.status().is_success() {
            return Err(super::api_error("OpenAI", response).await);
        }

        response
            .json()
            .await
            .context("OpenAI response JSON decode failed")
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        messages: &[ProviderMessage],
        params: &GenerationParams,
    ) -> anyhow::Result<ProviderResponse> {
        let request = Self::build_request(messages, params);
        let chat_response = self.call_api(&request).await?;
        let text = Self::extract_text(&chat_response)?;

        let mut provider_response = if let Some(usage) = chat_response.usage {
            ProviderResponse::with_usage(text, usage.prompt_tokens, usage.completion_tokens)
        } else {
            ProviderResponse::text_only(text)
        };
        if let Some(api_model) = chat_response.model {
            provider_response = provider_response.with_model(api_model);
        }
        Ok(provider_response)
    }

    async fn warmup(&self) -> anyhow::Result<()> {
        // Any response (even 401) means DNS, TCP and TLS are established.
        self.client
            .get(format!("{}/models", self.base_url))
            .send()
            .await
            .context("OpenAI warmup request failed")?;
        Ok(())
    }
}
