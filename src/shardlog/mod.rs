// src/shardlog/mod.rs

//! The shard log: the user-facing record of a checkset run.
//!
//! Every check logs through one shared [`ShardLogger`]. Each calling thread
//! is bound to a [`Shard`] on its first call, so interleaved output from
//! parallel checks stays attributable. Lines go to the console with ANSI
//! styling and, stripped of styling, to an append-only [`LogMirror`] file.
//!
//! - [`shard`] holds the thread → shard table.
//! - [`mirror`] owns the on-disk copy and its retry policy.
//! - [`style`] renders console lines and strips them for the mirror.

pub mod mirror;
pub mod shard;
pub mod style;

use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::errors::Result;

pub use mirror::LogMirror;
pub use shard::{Shard, ShardTable};

struct ConsoleState {
    shards: ShardTable,
    console: Box<dyn Write + Send>,
}

impl ConsoleState {
    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.console, "{line}").and_then(|()| self.console.flush()) {
            warn!(error = %e, "failed to write log line to console");
        }
    }
}

/// Thread-safe, shard-attributing logger shared by all checks of a run.
///
/// The shard table and the console share one lock; the mirror has its own.
/// A line is written to the console, the console lock is released, and only
/// then is the line appended to the mirror, so a mirror stuck in its retry
/// window holds up other mirror writes but never the console. Lines are
/// whole in both sinks. Each thread's lines keep their order in both.
pub struct ShardLogger {
    check_name: String,
    console: Mutex<ConsoleState>,
    mirror: Mutex<Option<LogMirror>>,
}

impl fmt::Debug for ShardLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardLogger")
            .field("check_name", &self.check_name)
            .field("mirror", &self.mirror_path())
            .finish_non_exhaustive()
    }
}

impl ShardLogger {
    /// Logger writing to stdout, without a file mirror.
    ///
    /// `check_name` is what the final `Passed`/`Failed` line reports.
    pub fn new(check_name: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            console: Mutex::new(ConsoleState {
                shards: ShardTable::new(),
                console: Box::new(std::io::stdout()),
            }),
            mirror: Mutex::new(None),
        }
    }

    /// Replace the console sink.
    pub fn with_console(self, console: Box<dyn Write + Send>) -> Self {
        lock(&self.console).console = console;
        self
    }

    /// Mirror every line, unstyled, into `mirror`.
    pub fn with_mirror(self, mirror: LogMirror) -> Self {
        *lock(&self.mirror) = Some(mirror);
        self
    }

    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    /// Current location of the mirror file, if any.
    pub fn mirror_path(&self) -> Option<PathBuf> {
        lock(&self.mirror).as_ref().map(|m| m.path().to_path_buf())
    }

    /// The calling thread's shard, assigning one if this thread is new.
    pub fn shard(&self) -> Shard {
        lock(&self.console).shards.shard_for(std::thread::current().id())
    }

    /// Log one line attributed to the calling thread's shard.
    #[track_caller]
    pub fn log(&self, message: impl AsRef<str>) {
        let location = Location::caller();
        self.emit(location, None, message.as_ref());
    }

    /// Log one line attributed to the overall run rather than a thread.
    #[track_caller]
    pub fn log_main(&self, message: impl AsRef<str>) {
        let location = Location::caller();
        self.emit(location, Some(Shard::MAIN), message.as_ref());
    }

    /// Move the mirror file to `dest`. No-op without a mirror.
    pub fn relocate(&self, dest: &Path) -> Result<()> {
        match lock(&self.mirror).as_mut() {
            Some(mirror) => mirror.relocate(dest),
            None => Ok(()),
        }
    }

    /// Log the overall pass line and exit the process with status 0.
    #[track_caller]
    pub fn check_passed(&self) -> ! {
        self.log_main(style::status_message(true, &self.check_name));
        std::process::exit(0)
    }

    /// Log the overall failure line and exit the process with status 1.
    #[track_caller]
    pub fn check_failed(&self) -> ! {
        self.log_main(style::status_message(false, &self.check_name));
        std::process::exit(1)
    }

    /// `shard: None` means the calling thread's own shard.
    fn emit(&self, location: &Location<'_>, shard: Option<Shard>, message: &str) {
        let line = {
            let mut console = lock(&self.console);
            let shard =
                shard.unwrap_or_else(|| console.shards.shard_for(std::thread::current().id()));
            let line = style::render_line(location, shard, message);
            console.write_line(&line);
            line
        };

        if let Some(mirror) = lock(&self.mirror).as_ref() {
            mirror.append(&style::strip_ansi(&line));
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A check that panicked mid-log must not silence everyone else.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
