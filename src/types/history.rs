use serde::{Deserialize, Serialize};

/// Launcher-side history entry, keyed by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_accessed: i64,
    #[serde(default)]
    pub access_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Usage summary over the launcher history cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatistics {
    pub total_tabs: usize,
    pub most_accessed: Option<HistoryEntry>,
    /// Milliseconds since epoch.
    pub oldest_access: Option<i64>,
    pub newest_access: Option<i64>,
}
