//! Locked, atomic JSON file access.
//!
//! Every data file has a sidecar `.lock` file. Readers take a shared lock on
//! it and writers an exclusive one, so a writer never interleaves with
//! another writer and a reader never sees a half-written file. Writes go to a
//! temporary file that is synced and then renamed over the target.
//!
//! All functions here block; callers run them inside `spawn_blocking`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::errors::{StorageError, StorageResult};

/// Held file lock, released on drop
pub(crate) struct FileLock {
    file: File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Path of the lock file guarding `path`
pub(crate) fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock_file(path: &Path) -> StorageResult<File> {
    let lock_path = lock_path_for(path);
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|err| StorageError::Lock(format!("open {}: {}", lock_path.display(), err)))
}

pub(crate) fn lock_shared(path: &Path) -> StorageResult<FileLock> {
    let file = open_lock_file(path)?;
    file.lock_shared()
        .map_err(|err| StorageError::Lock(format!("shared lock {}: {}", path.display(), err)))?;
    Ok(FileLock { file })
}

pub(crate) fn lock_exclusive(path: &Path) -> StorageResult<FileLock> {
    let file = open_lock_file(path)?;
    file.lock_exclusive()
        .map_err(|err| StorageError::Lock(format!("exclusive lock {}: {}", path.display(), err)))?;
    Ok(FileLock { file })
}

/// Read and parse a JSON file without locking; `None` if it does not exist
pub(crate) fn read_json_unlocked<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(StorageError::Io(format!("read {}: {}", path.display(), err)));
        }
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StorageError::Serialization(format!("parse {}: {}", path.display(), err)))
}

/// Read a JSON file under a shared lock
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let _lock = lock_shared(path)?;
    read_json_unlocked(path)
}

/// Serialize and atomically replace a file; the caller holds the exclusive lock
pub(crate) fn write_json_unlocked<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)
}

/// Serialize and atomically replace a file under an exclusive lock
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let _lock = lock_exclusive(path)?;
    write_json_unlocked(path, value)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::Io(format!("{} has no parent directory", path.display())))?;
    std::fs::create_dir_all(parent)?;

    let tmp = parent.join(format!(
        ".{}.tmp-{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("data"),
        std::process::id()
    ));

    {
        let mut file = File::create(&tmp)
            .map_err(|err| StorageError::Io(format!("create {}: {}", tmp.display(), err)))?;
        file.write_all(bytes)
            .map_err(|err| StorageError::Io(format!("write {}: {}", tmp.display(), err)))?;
        file.sync_all()
            .map_err(|err| StorageError::Io(format!("sync {}: {}", tmp.display(), err)))?;
    }

    std::fs::rename(&tmp, path).map_err(|err| {
        let _ = std::fs::remove_file(&tmp);
        StorageError::Io(format!(
            "rename {} -> {}: {}",
            tmp.display(),
            path.display(),
            err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path() {
        let path = Path::new("/data/menus.json");
        assert_eq!(lock_path_for(path), PathBuf::from("/data/menus.json.lock"));
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let value: Option<Vec<String>> = read_json(&dir.path().join("missing.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("values.json");
        write_json(&path, &vec!["a", "b"]).unwrap();

        let value: Option<Vec<String>> = read_json(&path).unwrap();
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));

        // no temporary files left behind
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let result: StorageResult<Option<Vec<String>>> = read_json(&path);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
