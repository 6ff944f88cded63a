// ABOUTME: Exclusive lock guarding state mutations across invocations.
// ABOUTME: Uses atomic file creation with holder info stored next to the state file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::types::Environment;

use super::StateError;

/// Information about who holds a state lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Environment being changed.
    pub environment: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(environment: Environment) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            environment: environment.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }
}

/// A held state lock. The lock file is removed on release or drop.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Acquire the lock at `path`.
    ///
    /// Fails with `StateError::Locked` while another fresh lock exists.
    /// Stale (>1 hour) or unreadable locks are broken with a warning, and
    /// `force` breaks any existing lock.
    pub fn acquire(path: &Path, environment: Environment, force: bool) -> Result<Self, StateError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }

        let info = LockInfo::new(environment);
        let body = serde_json::to_string(&info)
            .map_err(|e| StateError::Lock(format!("failed to serialize lock: {}", e)))?;

        if Self::try_create(path, &body)? {
            return Ok(Self::held(path));
        }

        let observed = fs::read_to_string(path).ok();
        let existing = observed
            .as_deref()
            .and_then(|content| serde_json::from_str::<LockInfo>(content).ok());

        match existing {
            Some(existing) if !force && !existing.is_stale() => {
                return Err(StateError::Locked {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            Some(existing) if force => {
                tracing::warn!(
                    "Breaking lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
            }
            Some(existing) => {
                tracing::warn!(
                    "Auto-breaking stale lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
            }
            None => tracing::warn!("Lock info unreadable, breaking lock"),
        }

        Self::take_over(path, observed.as_deref())?;

        if Self::try_create(path, &body)? {
            Ok(Self::held(path))
        } else {
            Err(StateError::Lock(
                "lock acquired by another process during break".to_string(),
            ))
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock, reporting failure to remove the file.
    pub fn release(mut self) -> Result<(), StateError> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::io(&self.path, e)),
        }
    }

    fn held(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            released: false,
        }
    }

    /// Create the lock file if absent. Returns false when it already exists.
    fn try_create(path: &Path, body: &str) -> Result<bool, StateError> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(body.as_bytes())
                    .and_then(|_| file.sync_all())
                    .map_err(|e| StateError::io(path, e))?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StateError::io(path, e)),
        }
    }

    /// Move the lock judged breakable out of the way.
    ///
    /// The file is renamed aside first, so only one breaker can claim it. If
    /// the claimed file is not the one that was judged, another process
    /// re-locked in between and its lock is put back.
    fn take_over(path: &Path, judged: Option<&str>) -> Result<(), StateError> {
        let aside = Self::aside_path(path);
        tracing::debug!("Moving lock at {} aside", path.display());
        match fs::rename(path, &aside) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StateError::io(path, e)),
        }

        let claimed = fs::read_to_string(&aside).ok();
        let result = if claimed.as_deref() == judged {
            Ok(())
        } else {
            if let Err(e) = fs::hard_link(&aside, path) {
                tracing::warn!("Failed to restore lock {}: {}", path.display(), e);
            }
            Err(StateError::Lock(
                "lock acquired by another process during break".to_string(),
            ))
        };

        if let Err(e) = fs::remove_file(&aside) {
            tracing::warn!("Failed to remove {}: {}", aside.display(), e);
        }
        result
    }

    fn aside_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(
            ".broken.{}.{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        path.with_file_name(name)
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove lock {}: {}", self.path.display(), e);
        }
    }
}
