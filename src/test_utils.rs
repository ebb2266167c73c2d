#[cfg(test)]
pub mod test_helpers {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use tokio::sync::{mpsc, oneshot};
    use tokio_util::sync::CancellationToken;

    use crate::config::SuggestionConfig;
    use crate::engine::SuggestionEngine;
    use crate::host::HostSurface;
    use crate::overlay::OverlayDescription;
    use crate::provider::{ProviderError, SuggestionProvider};

    pub const TEST_DEBOUNCE_MS: u64 = 500;

    /// In-memory host surface that records what the engine asked of it
    #[derive(Debug, Default)]
    pub struct FakeHost {
        pub text: String,
        pub cursor: usize,
        pub inserted: Vec<String>,
        pub renders: Vec<Option<OverlayDescription>>,
    }

    impl FakeHost {
        pub fn with_text(text: &str) -> Self {
            Self {
                text: text.to_string(),
                cursor: text.chars().count(),
                ..Default::default()
            }
        }

        /// Replace the text and put the cursor at its end
        pub fn type_text(&mut self, text: &str) {
            self.text = text.to_string();
            self.cursor = text.chars().count();
        }

        pub fn last_render(&self) -> Option<&Option<OverlayDescription>> {
            self.renders.last()
        }
    }

    impl HostSurface for FakeHost {
        fn text(&self) -> String {
            self.text.clone()
        }

        fn cursor_offset(&self) -> usize {
            self.cursor
        }

        fn insert_text_at_cursor(&mut self, text: &str) {
            let byte_index = self
                .text
                .char_indices()
                .nth(self.cursor)
                .map(|(i, _)| i)
                .unwrap_or(self.text.len());
            self.text.insert_str(byte_index, text);
            self.cursor += text.chars().count();
            self.inserted.push(text.to_string());
        }

        fn render_overlay(&mut self, overlay: Option<&OverlayDescription>) {
            self.renders.push(overlay.cloned());
        }
    }

    /// Provider that answers immediately from a queue of canned results
    ///
    /// Records every call; answers "" once the queue is empty.
    #[derive(Default)]
    pub struct ScriptedProvider {
        pub calls: Mutex<Vec<(String, usize)>>,
        pub tokens: Mutex<Vec<CancellationToken>>,
        responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    }

    impl ScriptedProvider {
        pub fn new(responses: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            })
        }

        pub fn replying(text: &str) -> Arc<Self> {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SuggestionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn fetch_suggestion<'a>(
            &'a self,
            text: &'a str,
            cursor_offset: usize,
            cancel: CancellationToken,
        ) -> BoxFuture<'a, Result<String, ProviderError>> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), cursor_offset));
            self.tokens.lock().unwrap().push(cancel);
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()));
            async move { response }.boxed()
        }
    }

    /// A provider call waiting for the test to answer it
    pub struct PendingFetch {
        pub text: String,
        pub cursor_offset: usize,
        pub token: CancellationToken,
        respond: oneshot::Sender<Result<String, ProviderError>>,
    }

    impl PendingFetch {
        pub fn resolve(self, text: &str) {
            let _ = self.respond.send(Ok(text.to_string()));
        }

        pub fn fail(self, error: ProviderError) {
            let _ = self.respond.send(Err(error));
        }
    }

    /// Provider whose calls stay pending until the test resolves them
    ///
    /// Deliberately ignores cancellation so tests can check that the engine
    /// fences late results on its own.
    pub struct ManualProvider {
        pending_tx: mpsc::UnboundedSender<PendingFetch>,
        calls: AtomicUsize,
    }

    impl ManualProvider {
        pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PendingFetch>) {
            let (pending_tx, pending_rx) = mpsc::unbounded_channel();
            let provider = Arc::new(Self {
                pending_tx,
                calls: AtomicUsize::new(0),
            });
            (provider, pending_rx)
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SuggestionProvider for ManualProvider {
        fn name(&self) -> &str {
            "Manual"
        }

        fn fetch_suggestion<'a>(
            &'a self,
            text: &'a str,
            cursor_offset: usize,
            cancel: CancellationToken,
        ) -> BoxFuture<'a, Result<String, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (respond, response) = oneshot::channel();
            let _ = self.pending_tx.send(PendingFetch {
                text: text.to_string(),
                cursor_offset,
                token: cancel,
                respond,
            });
            async move {
                response.await.unwrap_or_else(|_| {
                    Err(ProviderError::Network {
                        provider: "Manual".to_string(),
                        message: "dropped".to_string(),
                    })
                })
            }
            .boxed()
        }
    }

    pub fn test_config() -> SuggestionConfig {
        SuggestionConfig {
            debounce_ms: TEST_DEBOUNCE_MS,
            ..Default::default()
        }
    }

    pub fn attach_engine(
        host: FakeHost,
        provider: Arc<dyn SuggestionProvider>,
    ) -> SuggestionEngine<FakeHost> {
        SuggestionEngine::attach(host, provider, &test_config())
    }

    /// Let paused time run forward `ms` milliseconds
    ///
    /// Tasks due earlier run to completion first, so timers and immediate
    /// fetches spawned before this call have reported back afterwards.
    pub async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Advance past the debounce window and apply whatever came back
    pub async fn settle<H: HostSurface>(engine: &mut SuggestionEngine<H>) {
        advance(TEST_DEBOUNCE_MS + 1).await;
        engine.poll();
        // Fetch tasks spawned by the poll above
        advance(1).await;
        engine.poll();
    }
}
