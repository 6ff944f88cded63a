// ABOUTME: Error types for state persistence and locking.
// ABOUTME: Distinguishes I/O failures, revision conflicts, and held locks.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another writer switched traffic since the caller read the state.
    #[error("state changed concurrently (expected revision {expected}, found {found})")]
    Conflict { expected: u64, found: u64 },

    #[error("state is locked by {holder} (pid {pid}) since {started_at}; use --force to break it")]
    Locked {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("lock error: {0}")]
    Lock(String),
}

impl StateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StateError::Io {
            path: path.into(),
            source,
        }
    }
}
