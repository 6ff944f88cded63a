// ABOUTME: File-backed store for the active production color.
// ABOUTME: Reads never fail; writes are atomic compare-and-set under the state lock.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::types::{Color, Environment};

use super::{StateError, StateLock, StateRecord, write_atomic};

/// Persists which color receives traffic.
#[derive(Debug, Clone)]
pub struct ColorStateStore {
    path: PathBuf,
}

impl ColorStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lock file guarding this store.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Take the exclusive lock required for writes.
    pub fn lock(&self, environment: Environment, force: bool) -> Result<StateLock, StateError> {
        StateLock::acquire(&self.lock_path(), environment, force)
    }

    /// Current record. Missing or unreadable state yields blue at revision 0.
    pub fn read(&self) -> StateRecord {
        match fs::read_to_string(&self.path) {
            Ok(content) => StateRecord::parse(&content).unwrap_or_else(|| {
                tracing::warn!(
                    "Unrecognised state in {}, assuming {}",
                    self.path.display(),
                    Color::default()
                );
                StateRecord::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => StateRecord::default(),
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}: {}, assuming {}",
                    self.path.display(),
                    e,
                    Color::default()
                );
                StateRecord::default()
            }
        }
    }

    pub fn get_active(&self) -> Color {
        self.read().color
    }

    pub fn get_inactive(&self) -> Color {
        self.get_active().complement()
    }

    /// Persist `color` as active on top of whatever revision is current.
    pub fn set_active(&self, lock: &StateLock, color: Color) -> Result<StateRecord, StateError> {
        let current = self.read();
        self.compare_and_set(lock, current.revision, color)
    }

    /// Persist `color` only if the stored revision is still `expected`.
    pub fn compare_and_set(
        &self,
        lock: &StateLock,
        expected: u64,
        color: Color,
    ) -> Result<StateRecord, StateError> {
        if lock.path() != self.lock_path() {
            return Err(StateError::Lock(format!(
                "lock {} does not guard {}",
                lock.path().display(),
                self.path.display()
            )));
        }

        let current = self.read();
        if current.revision != expected {
            return Err(StateError::Conflict {
                expected,
                found: current.revision,
            });
        }

        let next = current.next(color);
        write_atomic(&self.path, &next.render()).map_err(|e| StateError::io(&self.path, e))?;
        tracing::info!(
            "Persisted active color {} (revision {}) to {}",
            next.color,
            next.revision,
            self.path.display()
        );
        Ok(next)
    }
}
