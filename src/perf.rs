//! Operation timings and the render debug log.
//!
//! Store mutations, loads, saves and render passes report here. A [`Scope`]
//! times one operation and carries the context it ran with (block count,
//! storage key, file path); when it ends it prints to stderr under `--perf`
//! and is recorded in the event log. [`log_event`] records one-off events.
//!
//! The event log is a plain text file, one numbered line per event:
//!
//! ```text
//! #3 +12.408ms store.insert type=image position=1 id=b-k2m9x0
//! ```

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Environment variable naming an event log file.
pub const DEBUG_LOG_ENV: &str = "BLOCKPAGE_RENDER_DEBUG_LOG";

static PRINT_TIMINGS: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: Mutex<Option<EventLog>> = Mutex::new(None);

/// An open event log file.
struct EventLog {
    opened: Instant,
    sequence: u64,
    out: BufWriter<File>,
}

impl EventLog {
    fn create(path: &Path) -> std::io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "# blockpage events, pid {}", std::process::id())?;
        out.flush()?;
        Ok(Self {
            opened: Instant::now(),
            sequence: 0,
            out,
        })
    }

    fn record(&mut self, name: &str, detail: &str) {
        self.sequence += 1;
        let since_open = millis(self.opened.elapsed());
        let line = if detail.is_empty() {
            format!("#{} +{since_open:.3}ms {name}", self.sequence)
        } else {
            format!("#{} +{since_open:.3}ms {name} {detail}", self.sequence)
        };
        // A failed write loses one line; editing must not stop for it.
        if writeln!(self.out, "{line}").and_then(|()| self.out.flush()).is_err() {
            tracing::debug!("event log write failed for {name}");
        }
    }
}

/// Poisoning only means another thread panicked mid-write; the log stays usable.
fn event_log() -> MutexGuard<'static, Option<EventLog>> {
    EVENT_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Timing guard for one operation.
#[derive(Debug)]
#[must_use = "a scope measures until it is dropped"]
pub struct Scope {
    name: &'static str,
    context: String,
    start: Instant,
}

impl Scope {
    /// Attach `key=value` context reported with the timing.
    pub fn with(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        if !self.context.is_empty() {
            self.context.push(' ');
        }
        let _ = write!(self.context, "{key}={value}");
        self
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let elapsed = millis(self.start.elapsed());
        if timings_enabled() {
            if self.context.is_empty() {
                eprintln!("[perf] {} {elapsed:.2}ms", self.name);
            } else {
                eprintln!("[perf] {} {elapsed:.2}ms ({})", self.name, self.context);
            }
        }
        let mut detail = std::mem::take(&mut self.context);
        if !detail.is_empty() {
            detail.push(' ');
        }
        let _ = write!(detail, "took={elapsed:.3}ms");
        log_event(self.name, detail);
    }
}

/// Start timing `name`.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        context: String::new(),
        start: Instant::now(),
    }
}

/// Print scope timings to stderr (`--perf`).
pub fn set_enabled(enabled: bool) {
    PRINT_TIMINGS.store(enabled, Ordering::Relaxed);
}

pub fn timings_enabled() -> bool {
    PRINT_TIMINGS.load(Ordering::Relaxed)
}

/// Event log path from the environment, if set and non-empty.
pub fn debug_log_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DEBUG_LOG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Start logging events to `path`, or stop when `None`.
///
/// # Errors
/// Returns an error if the file cannot be created; logging stays off then.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let log = path.map(EventLog::create).transpose()?;
    *event_log() = log;
    Ok(())
}

pub fn debug_log_active() -> bool {
    event_log().is_some()
}

/// Record one event if the log is open.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    if let Some(log) = event_log().as_mut() {
        log.record(name, detail.as_ref());
    }
}
