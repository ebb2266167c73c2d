//! Host text-editing surface
//!
//! The engine never owns the document. It reads text and cursor from the
//! host, asks it to insert accepted suggestions and hands it overlay
//! descriptions to draw. Change notifications flow the other way: the host
//! calls the engine's `on_*` operations.

use crate::overlay::OverlayDescription;

/// The surface a [`SuggestionEngine`](crate::engine::SuggestionEngine) binds to
pub trait HostSurface {
    /// Full document text
    fn text(&self) -> String;

    /// Cursor position in chars from the start of the document
    fn cursor_offset(&self) -> usize;

    /// Insert `text` at the cursor, leaving the cursor after it
    fn insert_text_at_cursor(&mut self, text: &str);

    /// Show (or with `None`, clear) the ghost text overlay
    fn render_overlay(&mut self, overlay: Option<&OverlayDescription>);
}
