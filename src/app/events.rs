use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;
use crate::router;

impl App {
    /// Handle one terminal event
    ///
    /// The suggestion router sees every event first; keys it claims never
    /// reach the editor.
    pub fn handle_event(&mut self, event: Event) {
        if router::route_event(&mut self.engine, &event).is_claimed() {
            return;
        }

        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::Paste(text) => {
                self.engine.host_mut().insert_str(&text);
                self.engine.on_edit();
            }
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        self.notice = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('s') => {
                    if let Err(e) = self.save() {
                        log::error!("Save failed: {}", e);
                        self.set_notice(format!("Save failed: {}", e));
                    }
                    return;
                }
                _ => {}
            }
        }

        let host = self.engine.host_mut();
        let cursor_before = host.cursor();
        let modified = host.textarea_mut().input(key);

        if modified {
            self.engine.host_mut().mark_changed();
            self.engine.on_edit();
        } else if self.engine.host().cursor() != cursor_before {
            self.engine.on_selection_change();
        }
    }
}
