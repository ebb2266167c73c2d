//! Suggestion provider abstraction
//!
//! Defines the SuggestionProvider trait, the ProviderError type, and the
//! factory that builds a concrete HTTP provider from configuration.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{AiConfig, AiProviderType};

mod anthropic;
mod openai;
pub mod prompt;
pub mod sse;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

/// Errors that can occur while fetching a suggestion
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is not configured (missing API key or model)
    #[error("[{provider}] AI not configured: {message}")]
    NotConfigured { provider: String, message: String },

    /// Network error during the request
    #[error("[{provider}] Network error: {message}")]
    Network { provider: String, message: String },

    /// API returned an error response
    #[error("[{provider}] API error ({code}): {message}")]
    Api {
        provider: String,
        code: u16,
        message: String,
    },

    /// Failed to parse the response
    #[error("[{provider}] Parse error: {message}")]
    Parse { provider: String, message: String },

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,
}

/// A remote service that continues text at a cursor
///
/// Implementations should stop promptly once `cancel` fires and return an
/// empty string, not an error, when they have nothing to suggest.
pub trait SuggestionProvider: Send + Sync {
    /// Short name used in logs and the status line
    fn name(&self) -> &str;

    fn fetch_suggestion<'a>(
        &'a self,
        text: &'a str,
        cursor_offset: usize,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;
}

/// Configured HTTP providers
#[derive(Debug)]
pub enum AiProvider {
    /// Anthropic Messages API
    Anthropic(AnthropicClient),
    /// OpenAI Chat Completions API or a compatible server
    OpenAi(OpenAiClient),
}

impl AiProvider {
    /// Create a provider from configuration
    ///
    /// Returns an error if the configuration is incomplete. API keys fall back
    /// to the `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` environment variables.
    pub fn from_config(config: &AiConfig) -> Result<Self, ProviderError> {
        Self::from_config_with_env(config, |name| std::env::var(name).ok())
    }

    fn from_config_with_env(
        config: &AiConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ProviderError> {
        match config.provider {
            AiProviderType::Anthropic => {
                let section = &config.anthropic;
                let api_key = non_empty(section.api_key.clone())
                    .or_else(|| non_empty(env("ANTHROPIC_API_KEY")))
                    .ok_or_else(|| {
                        not_configured(
                            anthropic::PROVIDER_NAME,
                            "Missing API key in [ai.anthropic] config or ANTHROPIC_API_KEY",
                        )
                    })?;
                let model = non_empty(section.model.clone()).ok_or_else(|| {
                    not_configured(
                        anthropic::PROVIDER_NAME,
                        "Missing or empty model in [ai.anthropic] config",
                    )
                })?;

                Ok(AiProvider::Anthropic(AnthropicClient::new(
                    api_key,
                    model,
                    section.max_tokens,
                )))
            }
            AiProviderType::OpenAi => {
                let section = &config.openai;
                // Local OpenAI-compatible servers often run without a key
                let api_key = non_empty(section.api_key.clone())
                    .or_else(|| non_empty(env("OPENAI_API_KEY")));
                let model = non_empty(section.model.clone()).ok_or_else(|| {
                    not_configured(
                        openai::PROVIDER_NAME,
                        "Missing or empty model in [ai.openai] config",
                    )
                })?;
                if section.base_url.trim().is_empty() {
                    return Err(not_configured(
                        openai::PROVIDER_NAME,
                        "Missing base_url in [ai.openai] config",
                    ));
                }

                Ok(AiProvider::OpenAi(OpenAiClient::new(
                    api_key,
                    model,
                    section.base_url.clone(),
                    section.max_tokens,
                )))
            }
        }
    }

    /// Wrap into the shared handle the engine expects
    pub fn into_shared(self) -> Arc<dyn SuggestionProvider> {
        Arc::new(self)
    }
}

impl SuggestionProvider for AiProvider {
    fn name(&self) -> &str {
        match self {
            AiProvider::Anthropic(client) => client.name(),
            AiProvider::OpenAi(client) => client.name(),
        }
    }

    fn fetch_suggestion<'a>(
        &'a self,
        text: &'a str,
        cursor_offset: usize,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        match self {
            AiProvider::Anthropic(client) => client.fetch_suggestion(text, cursor_offset, cancel),
            AiProvider::OpenAi(client) => client.fetch_suggestion(text, cursor_offset, cancel),
        }
    }
}

/// Stand-in used when no provider could be built
///
/// Every call fails with the construction error, so an engine bound to it
/// should be attached disabled.
#[derive(Debug)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(error: &ProviderError) -> Self {
        Self {
            reason: error.to_string(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl SuggestionProvider for UnavailableProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn fetch_suggestion<'a>(
        &'a self,
        _text: &'a str,
        _cursor_offset: usize,
        _cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        let error = not_configured("none", &self.reason);
        async move { Err(error) }.boxed()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn not_configured(provider: &str, message: &str) -> ProviderError {
    ProviderError::NotConfigured {
        provider: provider.to_string(),
        message: message.to_string(),
    }
}

/// Map a reqwest error into a network error for `provider`
pub(crate) fn network_error(provider: &str, error: reqwest::Error) -> ProviderError {
    ProviderError::Network {
        provider: provider.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
