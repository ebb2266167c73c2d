//! Suggestion fetcher
//!
//! Runs one provider call under one cancellation token and folds every way
//! it can end into a [`FetchOutcome`]. Nothing here touches engine state;
//! the engine decides what to do with the outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::provider::{ProviderError, SuggestionProvider};

/// One fetch attempt
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub text: String,
    pub cursor_offset: usize,
    /// Request sequence active when the attempt started
    pub sequence: u64,
    pub token: CancellationToken,
}

/// How a fetch attempt ended
#[derive(Debug)]
pub enum FetchOutcome {
    /// Provider returned a non-empty continuation
    Suggestion(String),
    /// Provider had nothing to suggest
    Empty,
    /// The attempt's token was cancelled before or during the call
    Cancelled,
    /// Provider failed
    Errored(ProviderError),
    /// Provider did not answer within the configured bound
    TimedOut,
}

impl FetchOutcome {
    /// The suggestion text, if any
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            FetchOutcome::Suggestion(text) => Some(text),
            _ => None,
        }
    }
}

/// Performs provider calls for the engine
#[derive(Clone)]
pub struct SuggestionFetcher {
    provider: Arc<dyn SuggestionProvider>,
    timeout: Option<Duration>,
}

impl SuggestionFetcher {
    /// `timeout` of `None` lets a call run until it resolves or is cancelled
    pub fn new(provider: Arc<dyn SuggestionProvider>, timeout: Option<Duration>) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the provider call for `request`
    ///
    /// The token is checked before the call, raced against it, and checked
    /// again afterwards, so a result that arrives after cancellation still
    /// comes back as `Cancelled`.
    pub async fn request(&self, request: &SuggestionRequest) -> FetchOutcome {
        let token = &request.token;
        if token.is_cancelled() {
            log::trace!("Request {} cancelled before start", request.sequence);
            return FetchOutcome::Cancelled;
        }

        let call = self
            .provider
            .fetch_suggestion(&request.text, request.cursor_offset, token.clone());

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = bounded(call, self.timeout) => Some(result),
        };

        if token.is_cancelled() {
            log::trace!("Request {} cancelled", request.sequence);
            return FetchOutcome::Cancelled;
        }

        match result {
            None | Some(Ok(Err(ProviderError::Cancelled))) => FetchOutcome::Cancelled,
            Some(Ok(Ok(text))) if text.trim().is_empty() => {
                log::debug!("Request {} returned no suggestion", request.sequence);
                FetchOutcome::Empty
            }
            Some(Ok(Ok(text))) => FetchOutcome::Suggestion(text),
            Some(Ok(Err(e))) => {
                log::warn!(
                    "Suggestion request {} to {} failed: {}",
                    request.sequence,
                    self.provider.name(),
                    e
                );
                FetchOutcome::Errored(e)
            }
            Some(Err(Elapsed)) => {
                log::warn!(
                    "Suggestion request {} to {} timed out",
                    request.sequence,
                    self.provider.name()
                );
                FetchOutcome::TimedOut
            }
        }
    }
}

/// Marker for a call that outlived its time bound
struct Elapsed;

async fn bounded<F, T>(future: F, timeout: Option<Duration>) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| Elapsed),
        None => Ok(future.await),
    }
}

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod fetcher_tests;
