use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{App, Message, Model};
use crate::document::parse_document;
use crate::ui::surface::Surface;
use crate::watcher::FileWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<FileWatcher> {
        FileWatcher::new(path, WATCH_DEBOUNCE)
    }

    /// Re-render whenever the cached document at `path` changes.
    ///
    /// Polls every `poll` until `keep_running` returns `false`. A change that
    /// does not parse keeps the current document.
    pub fn watch(
        &self,
        model: Model,
        surface: &mut dyn Surface,
        path: &Path,
        poll: Duration,
        mut keep_running: impl FnMut() -> bool,
    ) -> Result<Model> {
        let mut watcher = Self::make_file_watcher(path)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
        tracing::info!("watching {}", watcher.target_path().display());

        let mut model = model;
        self.render(&model, surface);
        while keep_running() {
            std::thread::sleep(poll);
            if watcher.take_change_ready() {
                self.reload(&mut model, surface);
            }
            model = self.dispatch(model, Message::Tick, surface);
        }
        Ok(model)
    }

    /// Reload the document from storage and rebuild the page.
    pub fn reload(&self, model: &mut Model, surface: &mut dyn Surface) {
        let _scope = crate::perf::scope("app.reload").with("key", self.storage_key());
        let text = match self.storage().get(self.storage_key()) {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!("cached document removed; keeping current content");
                return;
            }
            Err(err) => {
                tracing::warn!("reload failed: {err}");
                return;
            }
        };
        match parse_document(&text, model.seed()) {
            Ok(document) => {
                model.replace_document(document);
                let mut queue = VecDeque::new();
                self.apply_effects(model, surface, &mut queue);
            }
            Err(err) => tracing::warn!("ignoring unreadable cached document: {err}"),
        }
    }
}
