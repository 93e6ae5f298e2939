//! File-level mutual exclusion
//!
//! Writers to a store file acquire an exclusive lock by creating a `.lock`
//! sentinel next to the target (`create_new`, so creation is atomic on every
//! platform we run on). Contending writers busy-poll at a short interval and
//! give up after a bounded timeout; lock acquisition never blocks forever.
//!
//! Readers do not lock. The stores tolerate concurrent writers by re-reading,
//! which is acceptable for a read-mostly table.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shared::{SyncError, SyncResult};
use tokio::time::Instant;

/// Poll interval while waiting for a contended lock
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Give up waiting after this long
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Exclusive lock on a store file, implemented as a sentinel file
#[derive(Debug, Clone)]
pub struct FileLock {
    lock_path: PathBuf,
    poll_interval: Duration,
    timeout: Duration,
}

impl FileLock {
    /// Lock for the given store file (`<file>.lock` next to it)
    pub fn for_file(target: &Path) -> Self {
        let mut name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        name.push_str(".lock");
        Self {
            lock_path: target.with_file_name(name),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the wait bounds (tests use short timeouts)
    pub fn with_bounds(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    /// Acquire the lock, busy-polling up to the configured timeout
    ///
    /// On timeout the caller gets [`SyncError::LockTimeout`] and must treat
    /// the guarded mutation as not having happened.
    pub async fn acquire(&self) -> SyncResult<LockGuard> {
        let started = Instant::now();
        loop {
            match self.try_acquire() {
                Ok(guard) => return Ok(guard),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= self.timeout {
                        tracing::warn!(
                            lock = %self.lock_path.display(),
                            waited_ms = started.elapsed().as_millis() as u64,
                            "gave up waiting for file lock"
                        );
                        return Err(SyncError::LockTimeout {
                            path: self.lock_path.display().to_string(),
                            timeout_ms: self.timeout.as_millis() as u64,
                        });
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => return Err(SyncError::Io(e)),
            }
        }
    }

    fn try_acquire(&self) -> io::Result<LockGuard> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // create_new fails with AlreadyExists while another writer holds the lock
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)?;
        Ok(LockGuard {
            path: self.lock_path.clone(),
        })
    }
}

/// Held lock; releases (removes the sentinel) on drop
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release file lock");
        }
    }
}
