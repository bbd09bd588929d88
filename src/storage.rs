//! Local persistence of the ranking collection in a small key-value store.
//!
//! Failures here never reach the clock: loads fall back to an empty collection and
//! failed writes are logged and skipped.

use crate::models::MatchGroup;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the JSON array of match groups is stored.
pub const RANKINGS_KEY: &str = "game_clock_rankings_v1";

/// Errors from a key-value store backend.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    /// Key contains characters that cannot be used as a file name.
    InvalidKey(String),
    /// A writer panicked while holding the in-memory store.
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage I/O error: {}", e),
            StoreError::InvalidKey(k) => write!(f, "invalid storage key: {:?}", k),
            StoreError::Poisoned => write!(f, "storage lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// String values by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Replace in one step: temp file, then rename over the old one.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Process-local store, used by tests and when no data directory is wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load the ranking collection. Missing, unreadable or malformed data gives an empty collection.
pub fn load_rankings(store: &dyn KeyValueStore) -> Vec<MatchGroup> {
    let raw = match store.get(RANKINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::error!("Error loading rankings: {}", e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<MatchGroup>>(&raw) {
        Ok(groups) => {
            log::debug!("Loaded {} match group(s)", groups.len());
            groups
        }
        Err(e) => {
            log::error!("Error parsing stored rankings, starting empty: {}", e);
            Vec::new()
        }
    }
}

/// Write the ranking collection. Returns false (after logging) when the write was skipped.
pub fn save_rankings(store: &dyn KeyValueStore, groups: &[MatchGroup]) -> bool {
    let json = match serde_json::to_string(groups) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Error serializing rankings: {}", e);
            return false;
        }
    };
    match store.set(RANKINGS_KEY, &json) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Error saving rankings: {}", e);
            false
        }
    }
}
