//! Debounced watching of the cached document.
//!
//! Storage writes go through a temp file and a rename, so the watch is placed
//! on the parent directory and any event naming the directory, the file, or
//! its file name counts.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Coalesces bursts of events into one change after a quiet period.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    quiet: Duration,
    pending_since: Option<Instant>,
}

impl Debounce {
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending_since: None,
        }
    }

    /// Record activity at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// True once, when the quiet period since the last activity has passed.
    pub fn take_ready(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.quiet => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches one file and reports debounced changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Debounce,
}

impl FileWatcher {
    /// Watch `path`, which need not exist yet; its directory must.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        let path = path.as_ref();
        let watch_root = watch_root_for(path);
        // Events carry canonical paths; canonicalize the directory since the
        // file itself may be missing.
        let watch_root = watch_root.canonicalize().unwrap_or(watch_root);
        let target_name = path.file_name().map(std::ffi::OsStr::to_os_string);
        let target_path = target_name
            .as_ref()
            .map_or_else(|| watch_root.clone(), |name| watch_root.join(name));

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debounce: Debounce::new(debounce),
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain pending events; true once a debounced change is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => crate::perf::log_event("watch.error", format!("{err}")),
            }
        }
        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watch.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.target_path.display()
                ),
            );
        }
        let now = Instant::now();
        if relevant > 0 {
            self.debounce.touch(now);
        }
        self.debounce.take_ready(now)
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
