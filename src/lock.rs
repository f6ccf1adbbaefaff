//! Run lock serializing release runs that share one work tree
//!
//! The lock is a file created exclusively inside the git directory. It is
//! removed when the [RunLock] guard drops. A run that finds the file waits
//! for it to disappear, up to a timeout, and never breaks someone else's lock.
//!
//! Runs on separate machines never see each other's lock file. Exclusion
//! across all runs of a repository comes from the workflow's concurrency
//! group, see `demos/release-pr.yml`.

use crate::error::{ReleasePrError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const LOCK_FILE_NAME: &str = "release-pr.lock";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Held for the duration of a run
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Take the lock in `dir`, waiting up to `timeout` for a concurrent run
    pub fn acquire(dir: &Path, timeout: Duration) -> Result<Self> {
        Self::acquire_polling(dir, timeout, POLL_INTERVAL)
    }

    pub fn acquire_polling(dir: &Path, timeout: Duration, interval: Duration) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let started = Instant::now();
        let mut announced = false;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    let lock = RunLock::hold(path, file)?;
                    debug!(path = %lock.path.display(), "acquired run lock");
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        return Err(ReleasePrError::lock(format!(
                            "another release run holds {} (waited {}s)",
                            path.display(),
                            timeout.as_secs()
                        )));
                    }
                    if !announced {
                        info!(path = %path.display(), "waiting for a concurrent release run");
                        announced = true;
                    }
                    thread::sleep(interval);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Guard the freshly created `path`, then record our pid through
    /// `owner`. The file is removed again if the write fails.
    fn hold<W: Write>(path: PathBuf, mut owner: W) -> Result<Self> {
        let lock = RunLock { path };
        writeln!(owner, "{}", std::process::id())?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
