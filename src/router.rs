//! Key routing
//!
//! Decides which key presses the engine claims before the host's own key
//! handling sees them. The accept key is claimed only while a suggestion is
//! ready and the dismiss key only while something is active; everything else
//! passes through untouched.

use ratatui::crossterm::event::{Event, KeyEvent, KeyEventKind};

use crate::engine::{EngineSettings, Lifecycle, SuggestionEngine};
use crate::host::HostSurface;

/// Whether the host should still handle a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The engine consumed the key
    Claimed,
    /// The host handles the key as usual
    PassThrough,
}

impl KeyDisposition {
    pub fn is_claimed(self) -> bool {
        self == KeyDisposition::Claimed
    }
}

/// Engine command bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutedCommand {
    Accept,
    Dismiss,
}

/// Map a key to the engine command it would trigger in `lifecycle`
pub fn classify_key(
    settings: &EngineSettings,
    lifecycle: Lifecycle,
    key: &KeyEvent,
) -> Option<RoutedCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if lifecycle == Lifecycle::Ready && settings.accept_key.matches(key) {
        return Some(RoutedCommand::Accept);
    }

    if lifecycle.is_active() && settings.dismiss_key.matches(key) {
        return Some(RoutedCommand::Dismiss);
    }

    None
}

/// Offer a key to the engine
pub fn route_key<H: HostSurface>(
    engine: &mut SuggestionEngine<H>,
    key: &KeyEvent,
) -> KeyDisposition {
    if !engine.is_enabled() {
        return KeyDisposition::PassThrough;
    }

    let claimed = match classify_key(engine.settings(), engine.state().lifecycle(), key) {
        Some(RoutedCommand::Accept) => engine.on_accept_key(),
        Some(RoutedCommand::Dismiss) => engine.on_dismiss_key(),
        None => false,
    };

    if claimed {
        KeyDisposition::Claimed
    } else {
        KeyDisposition::PassThrough
    }
}

/// Offer a terminal event to the engine
///
/// Focus changes are reported to the engine and still passed through so the
/// host can track focus itself.
pub fn route_event<H: HostSurface>(
    engine: &mut SuggestionEngine<H>,
    event: &Event,
) -> KeyDisposition {
    match event {
        Event::Key(key) => route_key(engine, key),
        Event::FocusGained => {
            engine.on_focus_change(true);
            KeyDisposition::PassThrough
        }
        Event::FocusLost => {
            engine.on_focus_change(false);
            KeyDisposition::PassThrough
        }
        _ => KeyDisposition::PassThrough,
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod router_tests;
