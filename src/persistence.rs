//! Named text slots backing the reminder store.
//!
//! The store only needs "read the slot" and "replace the slot", so any
//! key-value layer can sit behind [`KeyValueStore`].
use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use log::{debug, error, trace};
use tempfile::NamedTempFile;

use crate::{ReminderError, Result};

/// A persistence layer of named text slots.
pub trait KeyValueStore: Send {
    /// Returns the slot's contents, or `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the slot's contents
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each slot as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            debug!("Creating data directory: {}", self.dir.display());
            fs::create_dir_all(&self.dir).map_err(|e| {
                error!("Failed to create data directory {}: {}", self.dir.display(), e);
                ReminderError::DirectoryError {
                    path: self.dir.clone(),
                }
            })?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => {
                trace!("Read {} bytes from {}", content.len(), path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ReminderError::Io(e)),
        }
    }

    /// Writes through a temporary file in the same directory, then renames it
    /// over the slot so a crash never leaves a half-written file behind.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.slot_path(key);

        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist slot {}: {}", path.display(), e.error);
            ReminderError::Io(e.error)
        })?;

        trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Slots held in memory. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| ReminderError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory slots".to_string(),
            })
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock_slots()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.lock_slots()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
