//! Editor rendering
//!
//! The document is drawn as a plain paragraph with the ghost text spliced in
//! at the cursor, rather than through the textarea widget, so the suggestion
//! can sit inline between the text before and after the cursor.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::App;
use crate::engine::Lifecycle;
use crate::host::HostSurface;
use crate::overlay::{GhostTextStyle, OverlayDescription};

impl App {
    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let [editor_area, status_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

        self.render_editor(frame, editor_area);
        self.render_status(frame, status_area);
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let has_focus = self.engine.state().has_focus();
        let border_color = if has_focus { Color::Cyan } else { Color::DarkGray };

        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "[scratch]".to_string());
        let modified = if self.is_modified() { " *" } else { "" };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {}{} ", name, modified))
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);

        let host = self.engine.host();
        let (row, col) = host.cursor();
        // Only draw the overlay where the engine anchored it
        let overlay = host
            .overlay()
            .filter(|overlay| overlay.anchor_offset == host.cursor_offset());
        let cursor_x = host
            .lines()
            .get(row)
            .map(|line| split_at_char(line, col).0.width())
            .unwrap_or(0);

        self.scroll = scroll_to_cursor(
            self.scroll,
            (row, cursor_x),
            (inner.height as usize, inner.width as usize),
        );
        let (top, left) = self.scroll;

        let lines = document_lines(host.lines(), (row, col), overlay);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((top as u16, left as u16));
        frame.render_widget(paragraph, area);

        if has_focus && inner.width > 0 && inner.height > 0 {
            frame.set_cursor_position(Position::new(
                inner.x + (cursor_x - left) as u16,
                inner.y + (row - top) as u16,
            ));
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let engine = self.engine();
        let settings = engine.settings();

        let (state_text, state_color) = if !engine.is_enabled() {
            ("suggestions off".to_string(), Color::DarkGray)
        } else {
            let lifecycle = engine.state().lifecycle();
            let color = match lifecycle {
                Lifecycle::Ready => Color::Green,
                Lifecycle::Fetching => Color::Yellow,
                Lifecycle::Debouncing => Color::Cyan,
                Lifecycle::Idle | Lifecycle::Dismissed => Color::DarkGray,
            };
            (format!("{} · {}", lifecycle, engine.provider_name()), color)
        };

        let mut spans = vec![
            Span::styled(" ghostline ", Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(" "),
            Span::styled(state_text, Style::default().fg(state_color)),
        ];

        match self.notice() {
            Some(notice) => {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)));
            }
            None => {
                spans.push(Span::styled(
                    format!(
                        "  {} accept · {} dismiss · ^S save · ^Q quit",
                        settings.accept_key.label(),
                        settings.dismiss_key.label()
                    ),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Style for ghost text
pub(crate) fn ghost_style(style: GhostTextStyle) -> Style {
    match style {
        GhostTextStyle::Faded => Style::default().fg(Color::DarkGray),
        GhostTextStyle::Italic => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
        GhostTextStyle::Dimmed => Style::default().add_modifier(Modifier::DIM),
    }
}

fn badge_style() -> Style {
    Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

/// Split `line` at char index `col`
fn split_at_char(line: &str, col: usize) -> (&str, &str) {
    let index = line
        .char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    line.split_at(index)
}

/// Build the document lines with `overlay` spliced in at `cursor`
///
/// A multi-line suggestion pushes the rest of the cursor line down below its
/// last line, previewing the text as it would read once accepted.
pub(crate) fn document_lines(
    lines: &[String],
    cursor: (usize, usize),
    overlay: Option<&OverlayDescription>,
) -> Vec<Line<'static>> {
    let (row, col) = cursor;
    let mut out = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let Some(overlay) = overlay.filter(|_| i == row) else {
            out.push(Line::raw(line.clone()));
            continue;
        };

        let (before, after) = split_at_char(line, col);
        let style = ghost_style(overlay.style);
        let badge = Span::styled(format!("[{}]", overlay.badge_label), badge_style());

        let mut spans = vec![
            Span::raw(before.to_string()),
            Span::styled(overlay.first_line().to_string(), style),
        ];
        if overlay.line_count() == 1 {
            spans.push(Span::raw(after.to_string()));
            spans.push(Span::raw(" "));
            spans.push(badge);
            out.push(Line::from(spans));
            continue;
        }

        spans.push(Span::raw(" "));
        spans.push(badge);
        out.push(Line::from(spans));

        let last = overlay.line_count() - 1;
        for (n, ghost) in overlay.ghost_text.split('\n').enumerate().skip(1) {
            let mut ghost_spans = vec![Span::styled(ghost.to_string(), style)];
            if n == last {
                ghost_spans.push(Span::raw(after.to_string()));
            }
            out.push(Line::from(ghost_spans));
        }
    }

    out
}

/// Adjust the (top, left) scroll so the cursor cell stays in view
///
/// `cursor` is (row, display column), `viewport` is (height, width).
pub(crate) fn scroll_to_cursor(
    scroll: (usize, usize),
    cursor: (usize, usize),
    viewport: (usize, usize),
) -> (usize, usize) {
    let (mut top, mut left) = scroll;
    let (row, x) = cursor;
    let (height, width) = viewport;

    if height > 0 {
        if row < top {
            top = row;
        } else if row >= top + height {
            top = row + 1 - height;
        }
    }

    if width > 0 {
        if x < left {
            left = x;
        } else if x >= left + width {
            left = x + 1 - width;
        }
    }

    (top, left)
}
