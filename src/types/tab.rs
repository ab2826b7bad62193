use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Title used when the browser reports none.
pub const UNTITLED: &str = "Untitled";

/// Returns the current UNIX timestamp in milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn default_title() -> String {
    UNTITLED.to_string()
}

/// One tracked tab in a recency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    /// Browser tab handle. Not stable across browser restarts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_accessed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl TabRecord {
    pub fn new(url: &str, title: &str) -> Self {
        let title = if title.trim().is_empty() {
            default_title()
        } else {
            title.to_string()
        };
        Self {
            id: None,
            title,
            url: url.to_string(),
            last_accessed: 0,
            fav_icon_url: None,
            pinned: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_last_accessed(mut self, last_accessed: i64) -> Self {
        self.last_accessed = last_accessed;
        self
    }

    pub fn with_fav_icon_url(mut self, fav_icon_url: &str) -> Self {
        self.fav_icon_url = Some(fav_icon_url.to_string());
        self
    }
}

/// Persisted form of a recency list: `{ tabs, lastUpdated }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabHistoryFile {
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
    #[serde(default)]
    pub last_updated: i64,
    /// Sent by older extension builds that filtered at write time. Ignored.
    #[serde(default, skip_serializing)]
    pub excluded_current_tab: Option<String>,
}

impl TabHistoryFile {
    pub fn new(tabs: Vec<TabRecord>, last_updated: i64) -> Self {
        Self {
            tabs,
            last_updated,
            excluded_current_tab: None,
        }
    }
}

/// Partial update for a single URL, applied by the merge path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl TabUpdate {
    pub fn touch(url: &str, last_accessed: i64) -> Self {
        Self {
            url: url.to_string(),
            last_accessed: Some(last_accessed),
            id: None,
            title: None,
            fav_icon_url: None,
            pinned: None,
        }
    }
}

impl From<&TabRecord> for TabUpdate {
    fn from(record: &TabRecord) -> Self {
        Self {
            url: record.url.clone(),
            last_accessed: Some(record.last_accessed),
            id: record.id,
            title: Some(record.title.clone()),
            fav_icon_url: record.fav_icon_url.clone(),
            pinned: record.pinned,
        }
    }
}

/// Body of `POST /update-recency`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecencyUpdateBatch {
    #[serde(default)]
    pub tab_updates: Vec<TabUpdate>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A tab as reported by the browser in tab events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserTab {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
}

impl BrowserTab {
    pub fn to_record(&self) -> TabRecord {
        TabRecord {
            id: Some(self.id),
            title: self
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(default_title),
            url: self.url.clone().unwrap_or_default(),
            last_accessed: 0,
            fav_icon_url: self.fav_icon_url.clone(),
            pinned: self.pinned.then_some(true),
        }
    }
}

/// One open tab in a live snapshot taken from the browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTab {
    pub id: i64,
    /// Automation-level window handle, as text (numeric for Chrome, opaque for Arc).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<String>,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<u32>,
}

impl From<&BrowserTab> for LiveTab {
    fn from(tab: &BrowserTab) -> Self {
        Self {
            id: tab.id,
            window_id: None,
            title: tab
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(default_title),
            url: tab.url.clone().unwrap_or_default(),
            favicon: tab.fav_icon_url.clone(),
            active: tab.active,
            window_index: None,
            tab_index: None,
        }
    }
}

/// Body of `POST /live-tabs`: every tab currently open in the browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTabsReport {
    #[serde(default)]
    pub tabs: Vec<BrowserTab>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// The most recent open-tab report held by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTabSnapshot {
    pub tabs: Vec<LiveTab>,
    pub reported_at: i64,
}

/// A live tab joined with its recorded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabWithHistory {
    #[serde(flatten)]
    pub tab: LiveTab,
    pub last_accessed: i64,
    pub access_count: u32,
}
