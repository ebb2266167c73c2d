//! OpenAI Chat Completions client
//!
//! Works against api.openai.com and OpenAI-compatible servers (Ollama,
//! llama.cpp, vLLM) via `base_url`.

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::prompt::{SYSTEM_PROMPT, build_completion_prompt, strip_echo};
use super::sse::{OpenAiEventParser, collect_stream};
use super::{ProviderError, SuggestionProvider, network_error};

pub(super) const PROVIDER_NAME: &str = "OpenAI";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
            max_tokens,
        }
    }

    /// Full URL of the chat completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(super) fn request_body(&self, text: &str, cursor_offset: usize) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_completion_prompt(text, cursor_offset) }
            ]
        })
    }

    pub async fn complete(
        &self,
        text: &str,
        cursor_offset: usize,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let mut request = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(text, cursor_offset));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            response = request.send() => response.map_err(|e| network_error(PROVIDER_NAME, e))?,
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                provider: PROVIDER_NAME.to_string(),
                code: status.as_u16(),
                message,
            });
        }

        let completion = collect_stream(PROVIDER_NAME, response, OpenAiEventParser, cancel).await?;
        Ok(strip_echo(completion, text, cursor_offset))
    }
}

impl SuggestionProvider for OpenAiClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_suggestion<'a>(
        &'a self,
        text: &'a str,
        cursor_offset: usize,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        async move { self.complete(text, cursor_offset, &cancel).await }.boxed()
    }
}
