//! Persistence bridge for TabTrail.
//!
//! Carries a recency list between processes as a flat, pretty-printed JSON
//! file (`{ tabs, lastUpdated }`). Writes go to a temporary file in the
//! destination directory and are renamed into place, so readers never see a
//! partial file. Reads never fail: a missing, empty, or undecodable file is
//! an empty list.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::managers::recency_list::RecencyList;
use crate::types::errors::PersistenceError;
use crate::types::tab::{now_millis, TabHistoryFile, TabRecord, TabUpdate};

/// Reads and writes one history file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file with a typed outcome.
    ///
    /// Missing and empty files are `Ok` with no tabs. Records without a URL
    /// are dropped.
    pub fn load_file(&self) -> Result<TabHistoryFile, PersistenceError> {
        let Some(mut file) = read_json::<TabHistoryFile>(&self.path)? else {
            return Ok(TabHistoryFile::default());
        };
        let before = file.tabs.len();
        file.tabs.retain(|t| !t.url.trim().is_empty());
        if file.tabs.len() != before {
            debug!(dropped = before - file.tabs.len(), path = %self.path.display(), "Dropped records without url");
        }
        Ok(file)
    }

    /// Loads the stored tabs, treating every failure as an empty list.
    pub fn load(&self) -> Vec<TabRecord> {
        match self.load_file() {
            Ok(file) => file.tabs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Treating history file as empty");
                Vec::new()
            }
        }
    }

    /// Atomically replaces the file with `tabs`, stamped with the current time.
    pub fn save(&self, tabs: &[TabRecord]) -> Result<(), PersistenceError> {
        self.save_file(&TabHistoryFile::new(tabs.to_vec(), now_millis()))
    }

    pub fn save_file(&self, file: &TabHistoryFile) -> Result<(), PersistenceError> {
        write_json_atomic(&self.path, file)?;
        debug!(tabs = file.tabs.len(), path = %self.path.display(), "Saved history file");
        Ok(())
    }

    /// Read-modify-write merge of partial updates.
    ///
    /// A corrupt file is merged into as if empty. There is no cross-process
    /// lock: a concurrent writer between the read and the rename loses its
    /// update.
    pub fn update(
        &self,
        updates: &[TabUpdate],
        batch_timestamp: i64,
        capacity: usize,
    ) -> Result<Vec<TabRecord>, PersistenceError> {
        let mut list = RecencyList::with_entries(self.load(), capacity);
        let applied = list.apply_updates(updates, batch_timestamp);
        let tabs = list.into_entries();
        self.save(&tabs)?;
        debug!(applied, total = tabs.len(), "Merged partial updates");
        Ok(tabs)
    }

    /// Writes an empty history.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.save(&[])
    }
}

/// Reads and decodes a JSON file. `Ok(None)` for a missing or blank file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PersistenceError::Unavailable(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| PersistenceError::DecodeFailed(format!("{}: {}", path.display(), e)))
}

/// Serializes `value` as pretty JSON and renames it over `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| {
        PersistenceError::Unavailable(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PersistenceError::Unavailable(format!("Failed to serialize: {}", e)))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| {
        PersistenceError::Unavailable(format!("Failed to create temp file in {}: {}", dir.display(), e))
    })?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PersistenceError::Unavailable(format!("Failed to write temp file: {}", e)))?;
    tmp.persist(path).map_err(|e| {
        PersistenceError::Unavailable(format!("Failed to rename into {}: {}", path.display(), e.error))
    })?;
    Ok(())
}
