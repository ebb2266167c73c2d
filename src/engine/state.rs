//! Suggestion lifecycle state
//!
//! One record per engine binding. Only the engine mutates it; everyone else
//! gets read access through the accessors below.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::debouncer::TimerHandle;

/// Where the current suggestion attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Nothing pending, nothing shown
    #[default]
    Idle,
    /// Waiting for the quiet period after an edit
    Debouncing,
    /// Provider call in flight
    Fetching,
    /// Suggestion available for accept
    Ready,
    /// Suggestion dismissed by the user, immediately followed by Idle
    Dismissed,
}

impl Lifecycle {
    /// Whether a suggestion exists or is being computed
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Lifecycle::Debouncing | Lifecycle::Fetching | Lifecycle::Ready
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Debouncing => "waiting",
            Lifecycle::Fetching => "thinking",
            Lifecycle::Ready => "ready",
            Lifecycle::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The engine's single mutable record
#[derive(Debug)]
pub struct SuggestionState {
    pub(super) lifecycle: Lifecycle,
    /// Non-empty iff lifecycle is Ready
    pub(super) suggestion_text: String,
    /// Bumped whenever an attempt lineage is superseded
    pub(super) request_sequence: u64,
    pub(super) active_token: Option<CancellationToken>,
    pub(super) pending_timer: Option<TimerHandle>,
    pub(super) has_focus: bool,
}

impl SuggestionState {
    /// Fresh state for a newly attached, focused surface
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            suggestion_text: String::new(),
            request_sequence: 0,
            active_token: None,
            pending_timer: None,
            has_focus: true,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn suggestion_text(&self) -> &str {
        &self.suggestion_text
    }

    pub fn request_sequence(&self) -> u64 {
        self.request_sequence
    }

    pub fn active_token(&self) -> Option<&CancellationToken> {
        self.active_token.as_ref()
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending_timer
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Check the record's invariants
    pub fn is_consistent(&self) -> bool {
        let text_matches_lifecycle =
            self.suggestion_text.is_empty() != (self.lifecycle == Lifecycle::Ready);
        let focus_forces_idle = self.has_focus || self.lifecycle == Lifecycle::Idle;
        let one_live_member = self.pending_timer.is_none() || self.active_token.is_none();
        text_matches_lifecycle && focus_forces_idle && one_live_member
    }

    /// Ready state holding `text`, for overlay tests
    #[cfg(test)]
    pub(crate) fn with_suggestion(text: &str, has_focus: bool) -> Self {
        Self {
            lifecycle: Lifecycle::Ready,
            suggestion_text: text.to_string(),
            has_focus,
            ..Self::new()
        }
    }
}

impl Default for SuggestionState {
    fn default() -> Self {
        Self::new()
    }
}
