//! Anthropic Claude API client
//!
//! Streams a short completion from the Messages API over SSE.

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::prompt::{SYSTEM_PROMPT, build_completion_prompt, strip_echo};
use super::sse::{AnthropicEventParser, collect_stream};
use super::{ProviderError, SuggestionProvider, network_error};

pub(super) const PROVIDER_NAME: &str = "Anthropic";

/// Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// JSON body for a completion at `cursor_offset`
    pub(super) fn request_body(&self, text: &str, cursor_offset: usize) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": build_completion_prompt(text, cursor_offset)
                }
            ]
        })
    }

    /// Request a completion, honouring `cancel` before and during the call
    pub async fn complete(
        &self,
        text: &str,
        cursor_offset: usize,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let request = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(text, cursor_offset))
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            response = request => response.map_err(|e| network_error(PROVIDER_NAME, e))?,
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

        let completion =
            collect_stream(PROVIDER_NAME, response, AnthropicEventParser, cancel).await?;
        Ok(strip_echo(completion, text, cursor_offset))
    }
}

impl SuggestionProvider for AnthropicClient {
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
