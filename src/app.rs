//! Demo editor
//!
//! A small terminal text editor that hosts the suggestion engine. It exists to
//! exercise the engine against a real editing surface: typing, cursor moves,
//! focus changes, accept and dismiss.

mod events;
mod host;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::SuggestionConfig;
use crate::engine::SuggestionEngine;
use crate::error::GhostlineError;
use crate::host::HostSurface;
use crate::provider::SuggestionProvider;

pub use host::TextAreaHost;

/// Editor state
pub struct App {
    engine: SuggestionEngine<TextAreaHost>,
    path: Option<PathBuf>,
    saved_revision: u64,
    should_quit: bool,
    /// One-line message shown in the status bar until the next key
    notice: Option<String>,
    /// First visible row and column of the editor viewport
    scroll: (usize, usize),
}

impl App {
    pub fn new(
        document: &str,
        path: Option<PathBuf>,
        provider: Arc<dyn SuggestionProvider>,
        config: &SuggestionConfig,
    ) -> Self {
        let host = TextAreaHost::new(document);
        Self {
            engine: SuggestionEngine::attach(host, provider, config),
            path,
            saved_revision: 0,
            should_quit: false,
            notice: None,
            scroll: (0, 0),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn engine(&self) -> &SuggestionEngine<TextAreaHost> {
        &self.engine
    }

    pub fn host(&self) -> &TextAreaHost {
        self.engine.host()
    }

    pub fn text(&self) -> String {
        self.engine.host().text()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.host().revision() != self.saved_revision
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Apply timer and fetch reports; call once per event-loop tick
    pub fn tick(&mut self) -> bool {
        self.engine.poll() > 0
    }

    /// Write the document back to its file
    pub fn save(&mut self) -> Result<(), GhostlineError> {
        let Some(path) = &self.path else {
            self.set_notice("No file name (start with: ghostline FILE)");
            return Ok(());
        };

        std::fs::write(path, self.engine.host().text())?;
        log::info!("Saved {}", path.display());
        self.saved_revision = self.host().revision();
        self.notice = Some(format!("Saved {}", path.display()));
        Ok(())
    }

    /// Unbind the engine and return the final document
    pub fn finish(self) -> String {
        self.engine.detach().text()
    }
}
