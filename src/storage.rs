//! Persistent key-value stores the identity provider writes sessions into.
//!
//! The core only reads. `set_item`/`remove_item` exist on the concrete
//! stores so the OIDC callback (or the CLI) can populate them.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// Read side of a string-to-string store, in the shape of browser local storage.
pub trait TokenStore: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be read. A
    /// missing key is `Ok(None)`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) {
        self.lock().remove(key);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// A JSON object file of string values. Re-read on every lookup so external
/// writers are observed immediately.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the file cannot be read or rewritten.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        items.insert(key.to_owned(), value.to_owned());
        self.save(&items)
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the file cannot be read or rewritten.
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.display(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt { path: self.display(), source })
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let rendered = serde_json::to_string_pretty(items)
            .map_err(|source| StorageError::Corrupt { path: self.display(), source })?;
        std::fs::write(&self.path, rendered).map_err(|source| StorageError::Io { path: self.display(), source })
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

impl TokenStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
