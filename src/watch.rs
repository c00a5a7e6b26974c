//! Polls a source file and reports modifications, for dev mode.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/* -------------------- *
 *        WATCHER       *
 * -------------------- */
/// Represents a modification-time poller over a single file.
#[derive(Debug, Clone)]
pub struct Watcher {
    path: PathBuf,
    interval: Duration,
    last_modified: Option<SystemTime>,
}

impl Watcher {
    /// Creates a new instance of [`Watcher`], remembering the current modification time of `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        let path = path.into();
        let last_modified = modified(&path).ok();

        Self {
            path,
            interval,
            last_modified,
        }
    }

    /// Returns the watched path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the file once. Returns true if its modification time changed since the last check.
    ///
    /// A file which cannot be inspected counts as unchanged.
    pub fn poll(&mut self) -> bool {
        match modified(&self.path) {
            Ok(time) if self.last_modified != Some(time) => {
                self.last_modified = Some(time);
                true
            }
            Ok(_) => false,
            Err(err) => {
                warn!(path = %self.path.display(), "cannot inspect source: {}", err);
                false
            }
        }
    }

    /// Calls `on_change` after every detected modification, forever.
    ///
    /// Each call runs to completion before the next poll.
    pub async fn run<F: FnMut()>(mut self, mut on_change: F) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if self.poll() {
                debug!(path = %self.path.display(), "source changed");
                on_change();
            }
        }
    }
}

/// Returns the modification time of `path`.
///
/// # Errors
///
/// Returns the I/O error if the metadata cannot be read.
#[inline]
pub fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
