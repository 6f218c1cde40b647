//! Persistence backends for the ledger.
//!
//! A store only knows how to read and write the whole collection at once;
//! every mutation rewrites it in full.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::{Entry, ResultEngine};

/// Backend holding the persisted collection of entries.
///
/// Methods may block; [`crate::Ledger`] calls them on tokio's blocking pool.
pub trait EntryStore: Send + Sync + std::fmt::Debug {
    /// Read every entry, in insertion order. A store that was never written
    /// holds an empty collection.
    fn load(&self) -> ResultEngine<Vec<Entry>>;

    /// Replace the persisted collection with `entries`.
    fn save(&self, entries: &[Entry]) -> ResultEngine<()>;
}

/// Collection stored as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl EntryStore for JsonFileStore {
    fn load(&self) -> ResultEngine<Vec<Entry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &[Entry]) -> ResultEngine<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(entries)?;
        // Write next to the target and rename, so a crash never leaves a
        // truncated collection behind.
        let temp = self.temp_path();
        fs::write(&temp, payload)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Non-persistent store, used for tests and `storage.memory = true`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl EntryStore for MemoryStore {
    fn load(&self) -> ResultEngine<Vec<Entry>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    fn save(&self, entries: &[Entry]) -> ResultEngine<()> {
        let mut stored = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = entries.to_vec();
        Ok(())
    }
}
