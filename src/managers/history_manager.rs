//! Launcher-side History Manager for TabTrail.
//!
//! Implements `HistoryManagerTrait`: a URL-keyed cache of `HistoryEntry`
//! values with access counts, persisted to its own JSON file and refreshed
//! from the shared history file written by the local server. Ranking joins a
//! live tab snapshot with this cache, ordered by `last_accessed` descending.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::services::history_store::{read_json, write_json_atomic, HistoryStore};
use crate::types::errors::{HistoryError, PersistenceError, RecencyError};
use crate::types::history::{HistoryEntry, HistoryStatistics};
use crate::types::tab::{now_millis, LiveTab, TabWithHistory};

/// Trait defining launcher history operations.
pub trait HistoryManagerTrait {
    fn initialize(&mut self);
    fn merge_extension_data(&mut self) -> usize;
    fn record_tab_access(&mut self, tab: &LiveTab) -> Result<(), RecencyError>;
    fn rank_tabs(&mut self, live: &[LiveTab]) -> Vec<TabWithHistory>;
    fn recent_view(&mut self, live: &[LiveTab], limit: usize) -> Vec<TabWithHistory>;
    fn recent_entries(&mut self, limit: usize) -> Vec<HistoryEntry>;
    fn clear(&mut self) -> Result<(), HistoryError>;
    fn export_json(&mut self) -> Result<String, HistoryError>;
    fn import_json(&mut self, json: &str) -> Result<usize, HistoryError>;
    fn statistics(&self) -> HistoryStatistics;
}

/// History manager backed by a JSON cache file.
pub struct HistoryManager {
    cache: HashMap<String, HistoryEntry>,
    cache_path: PathBuf,
    shared: HistoryStore,
    capacity: usize,
    initialized: bool,
}

impl HistoryManager {
    /// Launcher-side default capacity.
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(cache_path: impl Into<PathBuf>, shared: HistoryStore, capacity: usize) -> Self {
        Self {
            cache: HashMap::new(),
            cache_path: cache_path.into(),
            shared,
            capacity: capacity.max(1),
            initialized: false,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&HistoryEntry> {
        self.cache.get(url)
    }

    /// Cache entries, most recent first.
    fn sorted_entries(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self.cache.values().cloned().collect();
        entries.sort_by(|a, b| {
            b.last_accessed
                .cmp(&a.last_accessed)
                .then_with(|| a.url.cmp(&b.url))
        });
        entries
    }

    /// Drops the oldest entries beyond capacity and writes the cache file.
    fn persist(&mut self) -> Result<(), PersistenceError> {
        let mut entries = self.sorted_entries();
        if entries.len() > self.capacity {
            for dropped in entries.drain(self.capacity..) {
                self.cache.remove(&dropped.url);
            }
        }
        write_json_atomic(&self.cache_path, &entries)
    }

    fn persist_best_effort(&mut self) {
        if let Err(e) = self.persist() {
            warn!(path = %self.cache_path.display(), error = %e, "Failed to persist launcher history");
        }
    }
}

impl HistoryManagerTrait for HistoryManager {
    /// Loads the cache file and merges the shared file. Runs once; failures
    /// leave an empty cache rather than blocking the launcher.
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        match read_json::<Vec<HistoryEntry>>(&self.cache_path) {
            Ok(Some(entries)) => {
                let count = entries.len();
                for entry in entries.into_iter().filter(|e| !e.url.is_empty()) {
                    self.cache.insert(entry.url.clone(), entry);
                }
                debug!(count, "Loaded launcher history cache");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable launcher history cache"),
        }
        self.initialized = true;
        if self.merge_extension_data() == 0 && self.cache.len() > self.capacity {
            self.persist_best_effort();
        }
    }

    /// Upserts shared-file records that are newer than the cached entry and
    /// writes the cache back, trimmed to capacity, when anything changed.
    /// Returns how many entries changed.
    fn merge_extension_data(&mut self) -> usize {
        let mut merged = 0;
        for record in self.shared.load() {
            if record.url.is_empty() || record.last_accessed <= 0 {
                continue;
            }
            let previous = self.cache.get(&record.url);
            if previous.map_or(true, |e| e.last_accessed < record.last_accessed) {
                let access_count = previous.map_or(1, |e| e.access_count.saturating_add(1));
                self.cache.insert(
                    record.url.clone(),
                    HistoryEntry {
                        url: record.url,
                        title: record.title,
                        last_accessed: record.last_accessed,
                        access_count,
                        favicon: record.fav_icon_url,
                    },
                );
                merged += 1;
            }
        }
        if merged > 0 {
            debug!(merged, "Merged shared history into launcher cache");
            self.persist_best_effort();
        }
        merged
    }

    fn record_tab_access(&mut self, tab: &LiveTab) -> Result<(), RecencyError> {
        if tab.url.trim().is_empty() {
            return Err(RecencyError::InvalidRecord("url must not be empty".to_string()));
        }
        self.initialize();
        let access_count = self.cache.get(&tab.url).map_or(1, |e| e.access_count.saturating_add(1));
        self.cache.insert(
            tab.url.clone(),
            HistoryEntry {
                url: tab.url.clone(),
                title: tab.title.clone(),
                last_accessed: now_millis(),
                access_count,
                favicon: tab.favicon.clone(),
            },
        );
        self.persist_best_effort();
        debug!(url = %tab.url, access_count, "Recorded tab access");
        Ok(())
    }

    /// Joins each live tab with its history, most recent first. Tabs without
    /// history rank last with zero counts.
    fn rank_tabs(&mut self, live: &[LiveTab]) -> Vec<TabWithHistory> {
        self.initialize();
        self.merge_extension_data();

        let mut ranked: Vec<TabWithHistory> = live
            .iter()
            .map(|tab| {
                let entry = self.cache.get(&tab.url);
                let mut tab = tab.clone();
                if let Some(favicon) = entry.and_then(|e| e.favicon.clone()) {
                    tab.favicon = Some(favicon);
                }
                TabWithHistory {
                    tab,
                    last_accessed: entry.map_or(0, |e| e.last_accessed),
                    access_count: entry.map_or(0, |e| e.access_count),
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        ranked
    }

    /// The "recent tabs" list: ranked tabs minus the active tab (and other
    /// tabs showing its URL) and tabs never seen before.
    fn recent_view(&mut self, live: &[LiveTab], limit: usize) -> Vec<TabWithHistory> {
        let active_url = live.iter().find(|t| t.active).map(|t| t.url.clone());
        self.rank_tabs(live)
            .into_iter()
            .filter(|t| !t.tab.active && Some(&t.tab.url) != active_url.as_ref())
            .filter(|t| t.last_accessed > 0)
            .take(limit)
            .collect()
    }

    fn recent_entries(&mut self, limit: usize) -> Vec<HistoryEntry> {
        self.initialize();
        self.merge_extension_data();
        self.sorted_entries().into_iter().take(limit).collect()
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.cache.clear();
        match fs::remove_file(&self.cache_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(PersistenceError::Unavailable(format!(
                    "Failed to remove {}: {}",
                    self.cache_path.display(),
                    e
                ))
                .into())
            }
        }
        info!("Launcher history cleared");
        Ok(())
    }

    fn export_json(&mut self) -> Result<String, HistoryError> {
        self.initialize();
        serde_json::to_string_pretty(&self.sorted_entries())
            .map_err(|e| HistoryError::Import(format!("Failed to serialize history: {}", e)))
    }

    /// Imports an export. Entries without URL or access time are skipped;
    /// imported entries replace cached ones for the same URL.
    fn import_json(&mut self, json: &str) -> Result<usize, HistoryError> {
        let entries: Vec<HistoryEntry> =
            serde_json::from_str(json).map_err(|e| HistoryError::Import(e.to_string()))?;
        self.initialize();
        let mut imported = 0;
        for entry in entries {
            if entry.url.is_empty() || entry.last_accessed <= 0 {
                continue;
            }
            self.cache.insert(entry.url.clone(), entry);
            imported += 1;
        }
        self.persist()?;
        info!(imported, "Imported launcher history");
        Ok(imported)
    }

    fn statistics(&self) -> HistoryStatistics {
        let most_accessed = self
            .cache
            .values()
            .max_by(|a, b| {
                a.access_count
                    .cmp(&b.access_count)
                    .then_with(|| a.last_accessed.cmp(&b.last_accessed))
                    .then_with(|| b.url.cmp(&a.url))
            })
            .cloned();
        HistoryStatistics {
            total_tabs: self.cache.len(),
            most_accessed,
            oldest_access: self.cache.values().map(|e| e.last_accessed).min(),
            newest_access: self.cache.values().map(|e| e.last_accessed).max(),
        }
    }
}
