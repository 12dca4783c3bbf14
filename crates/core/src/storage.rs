//! Durable key-value storage
//!
//! A small string-to-string store persisted as a single JSON document on disk,
//! in the spirit of browser local storage:
//! - Synchronous reads and writes
//! - Survives process restarts
//! - Atomic replacement of the backing file on every write
//!
//! # Example
//!
//! ```rust,ignore
//! use cookbook_core::storage::{KeyValueStore, StorageConfig};
//!
//! let store = KeyValueStore::new(StorageConfig::default())?;
//!
//! store.set("@acc_token", "abc")?;
//! assert_eq!(store.get("@acc_token")?.as_deref(), Some("abc"));
//!
//! // Wipe everything
//! store.clear()?;
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name used when no explicit path is configured
const DEFAULT_FILE_NAME: &str = "storage.json";

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON document backing the store
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".cookbook"))
            .join("cookbook")
            .join(DEFAULT_FILE_NAME);

        Self { path }
    }
}

impl StorageConfig {
    /// Store data at a specific file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// File-backed key-value store
///
/// Every operation goes to disk, so two stores pointed at the same file (or two
/// processes) observe each other's writes. The in-process mutex only serializes
/// read-modify-write cycles.
#[derive(Debug)]
pub struct KeyValueStore {
    config: StorageConfig,
    write_lock: Mutex<()>,
}

impl KeyValueStore {
    /// Create a new store, ensuring the parent directory exists
    pub fn new(config: StorageConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Create a store at the default platform location
    pub fn default_store() -> Result<Self> {
        Self::new(StorageConfig::default())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Read a value
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.load()?;
        Ok(entries.remove(key))
    }

    /// Write a value, replacing any previous one
    ///
    /// A corrupt backing file is replaced by a fresh document holding only
    /// this key.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock()?;

        let mut entries = match self.load() {
            Err(e) if e.code == ErrorCode::StorageCorrupted => BTreeMap::new(),
            other => other?,
        };
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    /// Remove a value, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.lock()?;

        let mut entries = self.load()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.persist(&entries)?;
        }
        Ok(existed)
    }

    /// Remove every key
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;

        match fs::remove_file(&self.config.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List stored keys in sorted order
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }

    // Helper methods

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire storage lock"))
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.config.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            Error::new(ErrorCode::StorageCorrupted, "Storage file is not valid JSON")
                .with_context(self.config.path.display().to_string())
                .with_suggestion("Delete the storage file to start from a clean state")
                .with_source(e)
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let tmp_path = self.config.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(entries)?)
            .and_then(|()| fs::rename(&tmp_path, &self.config.path))
            .map_err(|e| {
                Error::storage("Failed to write storage file")
                    .with_context(self.config.path.display().to_string())
                    .with_source(e)
            })
    }
}
