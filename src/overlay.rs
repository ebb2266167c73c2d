//! Overlay renderer
//!
//! Turns the suggestion state into a plain description of what the host
//! should draw at the cursor. The description is a visual hint only: hosts
//! must keep it out of selection, hit-testing and copy.

use serde::{Deserialize, Serialize};

use crate::engine::{Lifecycle, SuggestionState};

/// How the host should de-emphasize ghost text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GhostTextStyle {
    /// Lighter color (typical ghost text)
    #[default]
    Faded,
    /// Italicized
    Italic,
    /// Dimmed
    Dimmed,
}

/// Presentation settings shared by every overlay of one engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayPresentation {
    pub badge_label: String,
    pub style: GhostTextStyle,
}

/// What the host draws for an active suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDescription {
    /// Cursor offset (in chars) the ghost text is drawn after
    pub anchor_offset: usize,
    pub ghost_text: String,
    /// Accept hint, e.g. "Tab"
    pub badge_label: String,
    pub style: GhostTextStyle,
}

impl OverlayDescription {
    /// Part of the ghost text drawn on the cursor's own line
    pub fn first_line(&self) -> &str {
        self.ghost_text.split('\n').next().unwrap_or_default()
    }

    /// Number of lines the ghost text spans once inserted
    pub fn line_count(&self) -> usize {
        self.ghost_text.split('\n').count()
    }
}

/// Derive the overlay for the current state
///
/// Returns `None` unless a non-empty suggestion is ready and the surface has
/// focus. The anchor always follows the cursor offset passed in, so hosts
/// that reflow or scroll stay correct.
pub fn derive_overlay(
    state: &SuggestionState,
    cursor_offset: usize,
    presentation: &OverlayPresentation,
) -> Option<OverlayDescription> {
    if state.lifecycle() != Lifecycle::Ready
        || state.suggestion_text().is_empty()
        || !state.has_focus()
    {
        return None;
    }

    Some(OverlayDescription {
        anchor_offset: cursor_offset,
        ghost_text: state.suggestion_text().to_string(),
        badge_label: presentation.badge_label.clone(),
        style: presentation.style,
    })
}
