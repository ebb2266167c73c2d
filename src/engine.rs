//! Suggestion state machine
//!
//! The engine binds to one host surface and owns the [`SuggestionState`] for
//! that binding. The host reports edits, cursor moves, focus changes and the
//! accept/dismiss keys through the `on_*` operations; timers and provider
//! calls run as tokio tasks and report back through a channel the host drains
//! with [`SuggestionEngine::poll`] on its event loop.
//!
//! Every timer expiry and fetch result carries the `request_sequence` that
//! was current when it was started. Anything that supersedes an attempt bumps
//! the sequence, so late arrivals from older attempts are dropped.

pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::cancel::CancellationSource;
use crate::classifier;
use crate::config::{KeyBinding, SuggestionConfig};
use crate::debouncer::{Debouncer, TimerHandle};
use crate::fetcher::{FetchOutcome, SuggestionFetcher, SuggestionRequest};
use crate::host::HostSurface;
use crate::overlay::{OverlayDescription, OverlayPresentation, derive_overlay};
use crate::provider::SuggestionProvider;

pub use state::{Lifecycle, SuggestionState};

/// Reports from timer and fetch tasks
#[derive(Debug)]
enum EngineEvent {
    QuietPeriodElapsed { sequence: u64, timer: TimerHandle },
    FetchResolved { sequence: u64, outcome: FetchOutcome },
}

/// Engine options derived from [`SuggestionConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub debounce: Duration,
    pub min_fragment_length: usize,
    pub fetch_timeout: Option<Duration>,
    pub accept_key: KeyBinding,
    pub dismiss_key: KeyBinding,
    pub presentation: OverlayPresentation,
}

impl EngineSettings {
    pub fn from_config(config: &SuggestionConfig) -> Self {
        let fetch_timeout =
            (config.fetch_timeout_ms > 0).then(|| Duration::from_millis(config.fetch_timeout_ms));
        let badge_label = config
            .badge_label
            .clone()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| config.accept_key.label());

        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_fragment_length: config.min_fragment_length,
            fetch_timeout,
            accept_key: config.accept_key,
            dismiss_key: config.dismiss_key,
            presentation: OverlayPresentation {
                badge_label,
                style: config.ghost_style,
            },
        }
    }
}

/// Timer and token lineage of one binding
///
/// Dropping it cancels the armed timer and every outstanding token, so an
/// engine that is dropped without `detach` leaves nothing running.
struct Binding {
    cancellation: CancellationSource,
    debouncer: Debouncer,
}

impl Binding {
    fn new(debounce: Duration) -> Self {
        let cancellation = CancellationSource::new();
        let debouncer = Debouncer::new(debounce, cancellation.binding_token());
        Self {
            cancellation,
            debouncer,
        }
    }

    fn is_torn_down(&self) -> bool {
        self.cancellation.is_shut_down()
    }

    fn tear_down(&mut self) {
        self.debouncer.cancel();
        self.cancellation.shutdown();
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.tear_down();
    }
}

/// Inline suggestion engine bound to one host surface
pub struct SuggestionEngine<H: HostSurface> {
    host: H,
    enabled: bool,
    settings: EngineSettings,
    state: SuggestionState,
    binding: Binding,
    fetcher: SuggestionFetcher,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    /// Last overlay handed to the host
    published: Option<OverlayDescription>,
}

impl<H: HostSurface> SuggestionEngine<H> {
    /// Bind a new engine to `host`
    ///
    /// The surface is assumed to have focus. With `enabled = false` in the
    /// config every operation is a no-op. Otherwise edits spawn tokio tasks,
    /// so the `on_*` operations must be called inside a tokio runtime.
    pub fn attach(
        host: H,
        provider: Arc<dyn SuggestionProvider>,
        config: &SuggestionConfig,
    ) -> Self {
        let settings = EngineSettings::from_config(config);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        log::debug!(
            "Attaching suggestion engine (enabled: {}, provider: {}, debounce: {:?})",
            config.enabled,
            provider.name(),
            settings.debounce
        );

        Self {
            host,
            enabled: config.enabled,
            binding: Binding::new(settings.debounce),
            fetcher: SuggestionFetcher::new(provider, settings.fetch_timeout),
            settings,
            state: SuggestionState::new(),
            events_tx,
            events_rx,
            published: None,
        }
    }

    /// Unbind from the host and hand it back
    ///
    /// The armed timer and the in-flight fetch are cancelled before this
    /// returns; no callback reaches the host afterwards.
    pub fn detach(self) -> H {
        let SuggestionEngine {
            mut host,
            mut binding,
            published,
            events_rx,
            ..
        } = self;

        binding.tear_down();
        drop(events_rx);
        if published.is_some() {
            host.render_overlay(None);
        }
        log::debug!("Detached suggestion engine");
        host
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.fetcher.provider_name()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Overlay for the current state, anchored at the host's cursor
    pub fn overlay(&self) -> Option<OverlayDescription> {
        derive_overlay(
            &self.state,
            self.host.cursor_offset(),
            &self.settings.presentation,
        )
    }

    /// Apply every timer expiry and fetch result that has arrived
    ///
    /// Returns the number of reports processed, stale ones included.
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                EngineEvent::QuietPeriodElapsed { sequence, timer } => {
                    self.on_quiet_period_elapsed(sequence, timer)
                }
                EngineEvent::FetchResolved { sequence, outcome } => {
                    self.on_fetch_resolved(sequence, outcome)
                }
            }
            processed += 1;
        }
        processed
    }

    /// The document was edited: restart the debounce window
    pub fn on_edit(&mut self) {
        if !self.enabled {
            return;
        }

        self.supersede();
        self.state.suggestion_text.clear();

        if !self.state.has_focus {
            self.transition(Lifecycle::Idle);
            self.publish();
            return;
        }

        let sequence = self.state.request_sequence;
        let events = self.events_tx.clone();
        let timer = self.binding.debouncer.arm(move |timer| {
            let _ = events.send(EngineEvent::QuietPeriodElapsed { sequence, timer });
        });
        self.state.pending_timer = Some(timer);

        self.transition(Lifecycle::Debouncing);
        self.publish();
    }

    /// The cursor moved without an edit: drop whatever is in progress
    pub fn on_selection_change(&mut self) {
        if !self.enabled || self.state.lifecycle == Lifecycle::Idle {
            return;
        }

        self.supersede();
        self.state.suggestion_text.clear();
        self.transition(Lifecycle::Idle);
        self.publish();
    }

    /// The surface gained or lost input focus
    ///
    /// Losing focus cancels everything. Regaining it only records the fact;
    /// the next edit starts a new attempt.
    pub fn on_focus_change(&mut self, has_focus: bool) {
        if !self.enabled {
            return;
        }

        if has_focus {
            self.state.has_focus = true;
            return;
        }

        self.supersede();
        self.state.suggestion_text.clear();
        self.state.has_focus = false;
        self.transition(Lifecycle::Idle);
        self.publish();
    }

    /// Insert the ready suggestion at the cursor
    ///
    /// Returns false, doing nothing, unless a suggestion is ready. The state
    /// is cleared and the overlay withdrawn before the host inserts the text,
    /// so the ghost text and the inserted text are never shown together.
    pub fn on_accept_key(&mut self) -> bool {
        if !self.enabled || self.state.lifecycle != Lifecycle::Ready {
            return false;
        }

        let text = std::mem::take(&mut self.state.suggestion_text);
        self.supersede();
        self.transition(Lifecycle::Idle);
        self.publish();

        log::debug!("Accepted suggestion ({} chars)", text.chars().count());
        self.host.insert_text_at_cursor(&text);
        true
    }

    /// Throw away the current suggestion or the attempt computing it
    ///
    /// Returns false, doing nothing, when there is nothing to dismiss.
    pub fn on_dismiss_key(&mut self) -> bool {
        if !self.enabled || !self.state.lifecycle.is_active() {
            return false;
        }

        self.supersede();
        self.state.suggestion_text.clear();
        self.transition(Lifecycle::Dismissed);
        self.transition(Lifecycle::Idle);
        self.publish();
        true
    }

    /// Apply the outcome of the fetch stamped with `sequence`
    ///
    /// Results from superseded attempts are discarded without touching the
    /// state or the overlay.
    pub fn on_fetch_resolved(&mut self, sequence: u64, outcome: FetchOutcome) {
        if !self.enabled {
            return;
        }

        let token_cancelled = self
            .state
            .active_token
            .as_ref()
            .is_some_and(|token| token.is_cancelled());
        if sequence != self.state.request_sequence
            || self.state.lifecycle != Lifecycle::Fetching
            || token_cancelled
        {
            log::debug!(
                "Discarding stale result of request {} (current {}, {})",
                sequence,
                self.state.request_sequence,
                self.state.lifecycle
            );
            return;
        }

        self.state.active_token = None;
        match outcome {
            FetchOutcome::Suggestion(text) if !text.is_empty() => {
                log::debug!("Request {} produced a suggestion", sequence);
                self.state.suggestion_text = text;
                self.transition(Lifecycle::Ready);
            }
            other => {
                log::debug!("Request {} produced no suggestion: {:?}", sequence, other);
                self.transition(Lifecycle::Idle);
            }
        }
        self.publish();
    }

    /// The debounce window closed: ask the classifier, then maybe fetch
    fn on_quiet_period_elapsed(&mut self, sequence: u64, timer: TimerHandle) {
        if !self.enabled || self.binding.is_torn_down() {
            return;
        }

        if self.state.lifecycle != Lifecycle::Debouncing
            || sequence != self.state.request_sequence
            || self.state.pending_timer != Some(timer)
        {
            log::debug!("Discarding stale timer {} for request {}", timer.id(), sequence);
            return;
        }

        self.binding.debouncer.mark_fired(timer);
        self.state.pending_timer = None;

        let text = self.host.text();
        let cursor_offset = self.host.cursor_offset();
        if !classifier::is_ready(&text, cursor_offset, self.settings.min_fragment_length) {
            log::debug!("Nothing to complete at offset {}", cursor_offset);
            self.transition(Lifecycle::Idle);
            self.publish();
            return;
        }

        self.start_fetch(text, cursor_offset);
    }

    fn start_fetch(&mut self, text: String, cursor_offset: usize) {
        let token = self.binding.cancellation.issue();
        let request = SuggestionRequest {
            text,
            cursor_offset,
            sequence: self.state.request_sequence,
            token: token.clone(),
        };
        self.state.active_token = Some(token);
        self.transition(Lifecycle::Fetching);
        self.publish();

        let fetcher = self.fetcher.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = fetcher.request(&request).await;
            if matches!(outcome, FetchOutcome::Cancelled) {
                return;
            }
            let _ = events.send(EngineEvent::FetchResolved {
                sequence: request.sequence,
                outcome,
            });
        });
    }

    /// End the current attempt lineage
    ///
    /// Clears the armed timer, cancels the in-flight token and bumps the
    /// sequence so anything they still deliver is stale.
    fn supersede(&mut self) {
        if self.state.pending_timer.take().is_some() {
            self.binding.debouncer.cancel();
        }
        if let Some(token) = self.state.active_token.take() {
            token.cancel();
        }
        self.binding.cancellation.cancel_current();
        self.state.request_sequence = self.state.request_sequence.wrapping_add(1);
    }

    fn transition(&mut self, to: Lifecycle) {
        if self.state.lifecycle != to {
            log::debug!("Suggestion lifecycle {} -> {}", self.state.lifecycle, to);
            self.state.lifecycle = to;
        }
    }

    /// Hand the overlay to the host if it changed
    fn publish(&mut self) {
        debug_assert!(
            self.state.is_consistent(),
            "inconsistent suggestion state: {:?}",
            self.state
        );

        let overlay = self.overlay();
        if overlay != self.published {
            self.host.render_overlay(overlay.as_ref());
            self.published = overlay;
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
