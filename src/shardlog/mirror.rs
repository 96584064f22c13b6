// src/shardlog/mirror.rs

//! Plain-text mirror of the shard log on disk.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, warn};

use crate::errors::Result;

/// How long a single line keeps retrying when the file is contended.
pub const DEFAULT_RETRY_WINDOW: Duration = Duration::from_secs(4);
/// Pause between attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Append-only log file, reopened for every line.
///
/// Reopening per line lets other processes (CI log collectors, editors)
/// hold the file briefly; a line that cannot be written within the retry
/// window is dropped rather than stalling the run.
#[derive(Debug)]
pub struct LogMirror {
    path: PathBuf,
    retry_window: Duration,
    retry_interval: Duration,
}

impl LogMirror {
    /// Create (or truncate) the mirror file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {:?}", parent))?;
        }
        fs::File::create(&path).with_context(|| format!("creating log file {:?}", path))?;

        Ok(Self {
            path,
            retry_window: DEFAULT_RETRY_WINDOW,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        })
    }

    pub fn with_retry(mut self, window: Duration, interval: Duration) -> Self {
        self.retry_window = window;
        self.retry_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Returns `false` if the line was dropped.
    pub fn append(&self, line: &str) -> bool {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.try_append(line) {
                Ok(()) => return true,
                Err(e) if started.elapsed() < self.retry_window => {
                    debug!(path = ?self.path, attempts, error = %e, "log mirror busy; retrying");
                    std::thread::sleep(self.retry_interval);
                }
                Err(e) => {
                    warn!(
                        path = ?self.path,
                        attempts,
                        error = %e,
                        "dropping log line after retry window elapsed"
                    );
                    return false;
                }
            }
        }
    }

    fn try_append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")
    }

    /// Move the log file to `dest`; later lines are appended there.
    pub fn relocate(&mut self, dest: impl Into<PathBuf>) -> Result<()> {
        let dest = dest.into();
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {:?}", parent))?;
        }

        if fs::rename(&self.path, &dest).is_err() {
            // Different filesystems: fall back to copy + remove.
            fs::copy(&self.path, &dest)
                .with_context(|| format!("copying log {:?} to {:?}", self.path, dest))?;
            fs::remove_file(&self.path)
                .with_context(|| format!("removing relocated log {:?}", self.path))?;
        }

        debug!(from = ?self.path, to = ?dest, "log mirror relocated");
        self.path = dest;
        Ok(())
    }
}
