//! Recency List for TabTrail.
//!
//! An ordered, URL-unique, capacity-bounded list of tab records, most recent
//! first. Front-to-back order always agrees with `last_accessed` descending:
//! stamps handed out by `record_access` are strictly monotonic within a list,
//! and every bulk operation re-sorts before truncating.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, trace};

use crate::types::errors::RecencyError;
use crate::types::tab::{now_millis, TabRecord, TabUpdate, UNTITLED};

/// Recency list owned by exactly one writer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyList {
    entries: Vec<TabRecord>,
    capacity: usize,
}

impl RecencyList {
    /// Browser-side default capacity.
    pub const DEFAULT_CAPACITY: usize = 50;

    /// Creates an empty list. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Builds a list from arbitrary records, restoring every invariant:
    /// records with empty URLs are dropped, the most recent record per URL
    /// wins, and the result is sorted and truncated.
    pub fn with_entries(entries: Vec<TabRecord>, capacity: usize) -> Self {
        let mut list = Self::new(capacity);
        list.replace(entries);
        list
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records front to back, most recent first.
    pub fn entries(&self) -> &[TabRecord] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TabRecord> {
        self.entries
    }

    pub fn get(&self, url: &str) -> Option<&TabRecord> {
        self.entries.iter().find(|r| r.url == url)
    }

    pub fn find_by_id(&self, id: i64) -> Option<&TabRecord> {
        self.entries.iter().find(|r| r.id == Some(id))
    }

    /// Records an access stamped with the current wall clock.
    pub fn record_access(&mut self, record: TabRecord) -> Result<&TabRecord, RecencyError> {
        self.record_access_at(record, now_millis())
    }

    /// Moves `record.url` to the front (inserting it if unseen), stamps it,
    /// and truncates to capacity.
    ///
    /// The stamp is `now`, raised above the newest remaining entry if needed,
    /// so the recorded entry is always strictly the most recent one.
    pub fn record_access_at(
        &mut self,
        mut record: TabRecord,
        now: i64,
    ) -> Result<&TabRecord, RecencyError> {
        if record.url.trim().is_empty() {
            return Err(RecencyError::InvalidRecord("url must not be empty".to_string()));
        }
        if record.title.trim().is_empty() {
            record.title = UNTITLED.to_string();
        }

        let before = self.entries.len();
        self.entries.retain(|r| r.url != record.url);
        if self.entries.len() != before {
            trace!(url = %record.url, "Moving existing entry to front");
        }

        let newest = self.entries.first().map(|r| r.last_accessed);
        record.last_accessed = match newest {
            Some(ts) if ts >= now => ts.saturating_add(1),
            _ => now,
        };

        self.entries.insert(0, record);
        self.truncate();
        Ok(&self.entries[0])
    }

    /// Applies a batch of partial updates in the order received.
    ///
    /// Known URLs are refreshed in place (every field present in the update
    /// overwrites the stored one); unknown URLs are inserted at the front.
    /// Updates without `last_accessed` take `batch_timestamp`. The list is
    /// then re-sorted by `last_accessed` descending and truncated. Applying
    /// the same batch twice yields the same list. Returns the number of
    /// updates applied; updates with an empty URL are skipped.
    pub fn apply_updates(&mut self, updates: &[TabUpdate], batch_timestamp: i64) -> usize {
        let mut applied = 0;
        for update in updates {
            if update.url.trim().is_empty() {
                debug!("Skipping partial update without url");
                continue;
            }
            let last_accessed = update.last_accessed.unwrap_or(batch_timestamp);
            match self.entries.iter_mut().find(|r| r.url == update.url) {
                Some(existing) => {
                    existing.last_accessed = last_accessed;
                    if let Some(id) = update.id {
                        existing.id = Some(id);
                    }
                    if let Some(title) = update.title.as_ref().filter(|t| !t.trim().is_empty()) {
                        existing.title = title.clone();
                    }
                    if let Some(icon) = &update.fav_icon_url {
                        existing.fav_icon_url = Some(icon.clone());
                    }
                    if let Some(pinned) = update.pinned {
                        existing.pinned = Some(pinned);
                    }
                }
                None => {
                    let mut record =
                        TabRecord::new(&update.url, update.title.as_deref().unwrap_or(UNTITLED))
                            .with_last_accessed(last_accessed);
                    record.id = update.id;
                    record.fav_icon_url = update.fav_icon_url.clone();
                    record.pinned = update.pinned;
                    self.entries.insert(0, record);
                }
            }
            applied += 1;
        }
        self.sort_and_truncate();
        applied
    }

    /// Replaces the whole list, restoring the invariants on the new records.
    pub fn replace(&mut self, records: Vec<TabRecord>) {
        let mut records: Vec<TabRecord> = records
            .into_iter()
            .filter(|r| !r.url.trim().is_empty())
            .collect();
        // After sorting, the first occurrence of a URL is its newest.
        records.sort_by(recency_order);
        let mut seen = HashSet::new();
        records.retain(|r| seen.insert(r.url.clone()));
        self.entries = records;
        self.truncate();
    }

    /// Empties the list.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the list without the active tab, leaving the stored list intact.
    pub fn view_excluding(&self, active_url: Option<&str>) -> Vec<TabRecord> {
        match active_url {
            Some(active) => self
                .entries
                .iter()
                .filter(|r| r.url != active)
                .cloned()
                .collect(),
            None => self.entries.clone(),
        }
    }

    fn sort_and_truncate(&mut self) {
        self.entries.sort_by(recency_order);
        self.truncate();
    }

    fn truncate(&mut self) {
        if self.entries.len() > self.capacity {
            debug!(capacity = self.capacity, dropped = self.entries.len() - self.capacity, "Trimming recency list");
            self.entries.truncate(self.capacity);
        }
    }
}

/// Most recent first; ties broken by URL so that bulk operations are
/// deterministic regardless of insertion order.
pub fn recency_order(a: &TabRecord, b: &TabRecord) -> Ordering {
    b.last_accessed
        .cmp(&a.last_accessed)
        .then_with(|| a.url.cmp(&b.url))
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
