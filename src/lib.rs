//! Ghostline: inline AI suggestions ("ghost text") for text-editing surfaces.
//!
//! The [`engine::SuggestionEngine`] binds to a [`host::HostSurface`], watches
//! edits, debounces them, asks a [`provider::SuggestionProvider`] for a
//! continuation and exposes the result as an [`overlay::OverlayDescription`]
//! the host draws after the cursor.

pub mod app;
pub mod cancel;
pub mod classifier;
pub mod config;
pub mod debouncer;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod host;
pub mod logging;
pub mod overlay;
pub mod provider;
pub mod router;

#[cfg(test)]
mod test_utils;

pub use engine::{Lifecycle, SuggestionEngine, SuggestionState};
pub use error::GhostlineError;
pub use host::HostSurface;
pub use overlay::OverlayDescription;
pub use provider::{ProviderError, SuggestionProvider};
pub use router::KeyDisposition;
