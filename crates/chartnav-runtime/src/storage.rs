#![forbid(unsafe_code)]

//! Key/value persistence for user state (marks).
//!
//! Values are JSON documents. [`JsonFileStorage`] keeps one file per key and
//! writes through a temp file followed by a rename, so a crash mid-write
//! leaves the previous document intact.
//!
//! # Failure Modes
//!
//! Implementations return errors; callers in this crate log them at `warn`
//! and carry on with in-memory state.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ahash::AHashMap;
use serde_json::Value as Json;

use crate::error::Result;

/// A string-keyed JSON store.
pub trait Storage {
    /// `Ok(None)` when the key was never written.
    fn load(&self, key: &str) -> Result<Option<Json>>;
    fn save(&mut self, key: &str, value: &Json) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Storage shared between the engine and its owner.
pub type SharedStorage = Rc<RefCell<dyn Storage>>;

/// Process-local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: AHashMap<String, Json>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Json>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &Json) -> Result<()> {
        self.entries.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One pretty-printed JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Store under `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// I/O errors from creating the directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<Json>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, key: &str, value: &Json) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(value)?;
        // Atomic write: temp file then rename
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, json)?;
        fs::rename(&temp, &path)?;
        tracing::debug!(key, path = %path.display(), "storage saved");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_round_trip() {
        let mut store = MemoryStorage::new();
        assert_eq!(store.load("k").unwrap(), None);
        store.save("k", &json!({"a": 1})).unwrap();
        assert_eq!(store.load("k").unwrap(), Some(json!({"a": 1})));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_round_trip_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStorage::open(dir.path()).unwrap();
        store.save("chartnav.marks.fig", &json!([1, 2])).unwrap();
        let path = store.path_for("chartnav.marks.fig");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load("chartnav.marks.fig").unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStorage::open(dir.path()).unwrap();
        assert_eq!(store.load("absent").unwrap(), None);
    }

    #[test]
    fn corrupted_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStorage::open(dir.path()).unwrap();
        fs::write(store.path_for("bad"), "{not json").unwrap();
        assert!(store.load("bad").is_err());
    }

    #[test]
    fn removing_absent_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStorage::open(dir.path()).unwrap();
        store.remove("absent").unwrap();
    }

    #[test]
    fn keys_are_sanitised() {
        let store = JsonFileStorage {
            dir: PathBuf::from("/tmp/x"),
        };
        assert_eq!(store.path_for("a/b c"), PathBuf::from("/tmp/x/a_b_c.json"));
    }
}
