//! Single-instance guard: a PID lock file in the temp directory.
//!
//! A lock is considered held when the file names a PID other than ours that
//! is still alive. Stale or unreadable lock files are taken over.

use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use thiserror::Error;
use tracing::{debug, info, warn};

const LOCK_FILE_NAME: &str = "snapask.lock";

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("another instance is already running (pid {0})")]
    AlreadyRunning(u32),

    #[error("failed to write lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Held lock; the file is removed on drop.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
}

impl InstanceLock {
    /// Default lock location, e.g. `/tmp/snapask.lock`.
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(LOCK_FILE_NAME)
    }

    /// Take the lock at `path`, failing if a live instance holds it.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, InstanceError> {
        let path = path.into();
        let pid = std::process::id();

        if let Some(other) = running_instance(&path) {
            return Err(InstanceError::AlreadyRunning(other));
        }

        fs::write(&path, pid.to_string()).map_err(|source| InstanceError::Io {
            path: path.clone(),
            source,
        })?;

        info!(pid, path = %path.display(), "instance lock acquired");
        Ok(Self { path, pid })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // Only remove the file if it still names us.
        if read_pid(&self.path) == Some(self.pid) {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove lock file");
            }
        }
    }
}

/// PID of another live instance holding `path`, if any.
pub fn running_instance(path: &Path) -> Option<u32> {
    let pid = read_pid(path)?;
    if pid == 0 || pid == std::process::id() {
        return None;
    }
    if is_process_alive(pid) {
        debug!(pid, "lock held by live process");
        Some(pid)
    } else {
        info!(pid, "previous instance is not running, ignoring stale lock");
        None
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn is_process_alive(pid: u32) -> bool {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        true,
        ProcessRefreshKind::nothing(),
    );
    system.process(target).is_some()
}
