use super::openai_types::{ChatRequest, ChatResponse, Message};
use crate::llm::{
    build_provider_client_with_timeout,
    scrub::api_error,
    traits::{CompletionRequest, Provider},
};
use anyhow::Context;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// OpenAI-compatible chat-completions backend.
pub struct OpenAiProvider {
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn with_base_url(api_key: Option<&str>, base_url: &str, timeout_secs: u64) -> Self {
        Self {
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    fn build_request(request: &CompletionRequest<'_>) -> ChatRequest {
        let capacity = if request.system_prompt.is_some() { 2 } else { 1 };
        let mut messages = Vec::with_capacity(capacity);

        if let Some(sys) = request.system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }

        messages.push(Message {
            role: "user",
            content: request.message.to_string(),
        });

        ChatRequest {
            model: request.model.to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn extract_text(chat_response: &ChatResponse) -> anyhow::Result<String> {
        chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))
    }

    async fn call_api(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let auth_header = self.cached_auth_header.as_ref().ok_or_else(|| {
            anyhow::anyhow!("OpenAI API key not set. Set OPENAI_API_KEY or edit config.toml.")
        })?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", auth_header)
            .json(request)
            .send()
            .await
            .context("OpenAI request failed")?;

        if !response.status().is_success() {
            return Err(api_error("OpenAI", response).await);
        }

        response
            .json()
            .await
            .context("OpenAI response JSON decode failed")
    }
}

impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let chat_request = Self::build_request(&request);
            let chat_response = self.call_api(&chat_request).await?;
            if let Some(usage) = &chat_response.usage {
                debug!(
                    model = chat_response.model.as_deref().unwrap_or(request.model),
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "OpenAI completion finished"
                );
            }
            Self::extract_text(&chat_response)
        })
    }
}
