// src/stamp/mod.rs

//! Time-windowed stamp cache.
//!
//! A stamp is a small marker file `<dir>/<id>_stamp` whose modification time
//! records when the action identified by `id` was last performed. A stamp is
//! *fresh* while its age is within [`STAMP_TTL`]. Stamps are used for two
//! things:
//!
//! - skipping expensive setup (tool installs, package index refreshes) that
//!   already ran recently, see [`StampCache::ensure_fresh`];
//! - marking a finding (an artifact written by a check) as having reported
//!   success, so a later reporting pass can ask without re-running anything.
//!
//! The engine never deletes stamps. A stamp removed by hand simply reads as
//! "never stamped".

pub mod clock;

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::Result;

pub use clock::{Clock, SystemClock};

/// How long a stamp stays fresh.
pub const STAMP_TTL: Duration = Duration::from_secs(6 * 60 * 60);

const FINDING_PREFIX: &str = "findings_pass_";

/// Filesystem-backed stamp store rooted at a tools/cache directory.
///
/// Cloning is cheap; clones share the clock.
#[derive(Debug, Clone)]
pub struct StampCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl StampCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the marker file for `id`.
    pub fn stamp_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}_stamp"))
    }

    /// Record "now" against `id`, replacing any previous stamp.
    ///
    /// The marker is written to a temporary file in the same directory and
    /// renamed into place, so readers never observe a half-written stamp.
    pub fn stamp(&self, id: &str) -> Result<()> {
        let path = self.stamp_path(id);
        let now = self.clock.now();

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating stamp directory {:?}", self.dir))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("creating temporary stamp in {:?}", self.dir))?;
        writeln!(tmp, "# {}", human_timestamp(now))
            .with_context(|| format!("writing stamp {id}"))?;
        tmp.as_file()
            .set_modified(now)
            .with_context(|| format!("setting modification time of stamp {id}"))?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("persisting stamp {:?}", path))?;

        debug!(id, path = ?path, "stamp recorded");
        Ok(())
    }

    /// Whether a stamp for `id` exists and is within [`STAMP_TTL`].
    pub fn is_fresh(&self, id: &str) -> bool {
        let path = self.stamp_path(id);
        let modified = match std::fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!(id, error = %e, "stamp unreadable; treating as absent");
                }
                return false;
            }
        };

        match self.clock.now().duration_since(modified) {
            Ok(age) => age <= STAMP_TTL,
            // Stamped "in the future" relative to our clock.
            Err(_) => true,
        }
    }

    /// Run `action` unless `id` is fresh, stamping `id` once it succeeds.
    ///
    /// The outer `Err` is a stamp I/O fault. The inner result is the
    /// action's own: `Ok(true)` if it ran and succeeded, `Ok(false)` if it
    /// was skipped, `Err(e)` if it failed (no stamp is written then).
    pub fn ensure_fresh<F, E>(&self, id: &str, action: F) -> Result<std::result::Result<bool, E>>
    where
        F: FnOnce() -> std::result::Result<(), E>,
    {
        if self.is_fresh(id) {
            debug!(id, "stamp fresh; skipping action");
            return Ok(Ok(false));
        }

        if let Err(e) = action() {
            return Ok(Err(e));
        }
        self.stamp(id)?;
        Ok(Ok(true))
    }

    /// Flag the finding stored at `path` as having reported success.
    pub fn mark_finding_ok(&self, path: &Path) -> Result<()> {
        self.stamp(&finding_stamp_id(path))
    }

    /// Whether the finding stored at `path` reported success recently.
    pub fn is_finding_ok(&self, path: &Path) -> bool {
        self.is_fresh(&finding_stamp_id(path))
    }
}

fn finding_stamp_id(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{FINDING_PREFIX}{name}")
}

fn human_timestamp(t: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(t)
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
}
