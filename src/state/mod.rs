// ABOUTME: Persisted active-color state with revisioned compare-and-set.
// ABOUTME: Exports the store, its record format, and the exclusive state lock.

mod error;
mod lock;
mod record;
mod store;

pub use error::StateError;
pub use lock::{LockInfo, StateLock};
pub use record::StateRecord;
pub use store::ColorStateStore;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `contents` so readers see either the old or the new file.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(format!(".tmp-{}", std::process::id()));
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("value");

        write_atomic(&path, "green\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "green\n");
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");

        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }
}
