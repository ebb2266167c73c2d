//! Host surface over a `tui_textarea::TextArea`

use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};

use crate::host::HostSurface;
use crate::overlay::OverlayDescription;

/// Multi-line editor buffer the suggestion engine is bound to
pub struct TextAreaHost {
    textarea: TextArea<'static>,
    overlay: Option<OverlayDescription>,
    /// Bumped on every change to the document
    revision: u64,
}

impl TextAreaHost {
    /// Load `text` with the cursor at its end
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(String::from).collect();
        let mut textarea = TextArea::new(lines);
        textarea.set_cursor_line_style(Style::default());
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);

        Self {
            textarea,
            overlay: None,
            revision: 0,
        }
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn textarea_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.textarea
    }

    pub fn lines(&self) -> &[String] {
        self.textarea.lines()
    }

    /// (row, column) of the cursor, column in chars
    pub fn cursor(&self) -> (usize, usize) {
        self.textarea.cursor()
    }

    /// Overlay last handed over by the engine
    pub fn overlay(&self) -> Option<&OverlayDescription> {
        self.overlay.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Insert at the cursor, splitting on newlines
    pub fn insert_str(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.textarea.insert_newline();
            }
            if !part.is_empty() {
                self.textarea.insert_str(part);
            }
        }
        self.mark_changed();
    }
}

impl HostSurface for TextAreaHost {
    fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn cursor_offset(&self) -> usize {
        let (row, col) = self.textarea.cursor();
        let preceding: usize = self
            .textarea
            .lines()
            .iter()
            .take(row)
            .map(|line| line.chars().count() + 1)
            .sum();
        preceding + col
    }

    fn insert_text_at_cursor(&mut self, text: &str) {
        self.insert_str(text);
    }

    fn render_overlay(&mut self, overlay: Option<&OverlayDescription>) {
        self.overlay = overlay.cloned();
    }
}
