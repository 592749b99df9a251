//! Per-client string storage, the substrate under the local adapter and the
//! custom config store.
//!
//! Models the browser's per-origin string store: flat string keys, string
//! values, no transactions. Implementations must tolerate concurrent
//! processes racing on the same key; callers accept lost updates.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Flat key-value string storage.
///
/// Implement this to back the local tier with a different medium. The
/// built-in implementations are [`FileStringStore`] (one file per key under
/// a data directory) and [`MemoryStringStore`] (tests, ephemeral).
pub trait StringStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Write `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove the entry under `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;

    /// Probe availability by writing and removing a throwaway key.
    /// Any failure (read-only medium, full disk, denied directory) means
    /// the local tier is unusable.
    fn is_available(&self) -> bool {
        const PROBE_KEY: &str = "__storage_probe__";
        self.set(PROBE_KEY, PROBE_KEY).is_ok() && self.remove(PROBE_KEY).is_ok()
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStringStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStringStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringStore for MemoryStringStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one file per key under a data directory.
///
/// Keys are sanitized into file names (anything outside `[A-Za-z0-9._-]`
/// becomes `_`) so organization names with spaces map to stable paths.
#[derive(Debug)]
pub struct FileStringStore {
    dir: PathBuf,
}

impl FileStringStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(safe)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StringStore for FileStringStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
