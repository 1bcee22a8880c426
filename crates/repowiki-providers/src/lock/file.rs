//! File lock provider
//!
//! Each key maps to `<dir>/<key>.lock`, guarded by an exclusive OS advisory
//! lock taken with `fs2`. The open handle stays in the provider until the
//! guard is released; if the process dies the OS drops the lock with it, so
//! no lock file ever has to be broken by hand. The lock file itself is left
//! in place after release.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use fs2::FileExt;
use repowiki_domain::error::{Error, Result};
use repowiki_domain::ports::infrastructure::{LockGuard, LockProvider};
use tracing::{debug, warn};

use crate::constants::{LOCK_DEFAULT_TIMEOUT, LOCK_POLL_INTERVAL};

/// Lock provider backed by advisory locks on files in one directory
#[derive(Debug, Clone)]
pub struct FileLockProvider {
    dir: PathBuf,
    timeout: Duration,
    /// Locked handles by guard token
    held: Arc<DashMap<String, File>>,
}

impl FileLockProvider {
    /// Create a provider storing lock files in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timeout: LOCK_DEFAULT_TIMEOUT,
            held: Arc::new(DashMap::new()),
        }
    }

    /// Maximum time to wait for a lock
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.lock"))
    }
}

#[async_trait]
impl LockProvider for FileLockProvider {
    async fn acquire_lock(&self, key: &str) -> Result<LockGuard> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::io_with_source(format!("Failed to create lock directory {}", self.dir.display()), e)
        })?;

        let path = self.lock_path(key);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io_with_source(format!("Failed to open lock {}", path.display()), e))?;

        let started = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if started.elapsed() >= self.timeout {
                        return Err(Error::store(format!(
                            "timed out after {:?} waiting for lock {key}",
                            self.timeout
                        )));
                    }
                    tokio::time::sleep(LOCK_POLL_INTERVAL).await;
                }
                Err(e) => {
                    return Err(Error::io_with_source(
                        format!("Failed to lock {}", path.display()),
                        e,
                    ));
                }
            }
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.held.insert(token.clone(), file);
        debug!(key, "Lock acquired");
        Ok(LockGuard {
            key: key.to_string(),
            token,
        })
    }

    async fn release_lock(&self, guard: LockGuard) -> Result<()> {
        let Some((_, file)) = self.held.remove(&guard.token) else {
            return Err(Error::store(format!(
                "lock {} is not held by this owner",
                guard.key
            )));
        };
        if let Err(e) = FileExt::unlock(&file) {
            // Closing the handle below still drops the lock.
            warn!(key = %guard.key, error = %e, "Failed to unlock explicitly");
        }
        drop(file);
        debug!(key = %guard.key, "Lock released");
        Ok(())
    }
}
