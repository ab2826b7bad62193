use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platform;

/// Top-level TabTrail settings container.
///
/// Every section falls back to its defaults, so a settings file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TrailSettings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub history: HistorySettings,
    pub focus: FocusSettings,
    pub policy: PolicySettings,
}

/// Loopback server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound for every client call to the local server.
    pub request_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8987,
            request_timeout_ms: 500,
        }
    }
}

impl ServerSettings {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Where each component keeps its JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Shared file written by the server and read by the launcher.
    pub history_file: PathBuf,
    /// Browser-side tracker's private copy of its list.
    pub tracker_store_file: PathBuf,
    /// Launcher history cache with access counts.
    pub launcher_cache_file: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let data_dir = platform::get_data_dir();
        Self {
            history_file: platform::default_history_file(),
            tracker_store_file: data_dir.join("tracker-history.json"),
            launcher_cache_file: data_dir.join("launcher-history.json"),
        }
    }
}

/// How the tracker pushes changes to the local server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// Replace the whole list via `POST /tabs`.
    #[default]
    Full,
    /// Send only the changed record via `POST /update-recency`.
    Incremental,
}

/// Recency list sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    pub tracker_capacity: usize,
    pub launcher_capacity: usize,
    pub recent_view_limit: usize,
    pub push_mode: PushMode,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            tracker_capacity: 50,
            launcher_capacity: 100,
            recent_view_limit: 20,
            push_mode: PushMode::Full,
        }
    }
}

/// Chromium-family browsers reachable through AppleScript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFlavor {
    #[default]
    Arc,
    Chrome,
    Brave,
    Edge,
}

impl BrowserFlavor {
    /// Application name as AppleScript addresses it.
    pub fn app_name(self) -> &'static str {
        match self {
            BrowserFlavor::Arc => "Arc",
            BrowserFlavor::Chrome => "Google Chrome",
            BrowserFlavor::Brave => "Brave Browser",
            BrowserFlavor::Edge => "Microsoft Edge",
        }
    }
}

/// Tab focusing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FocusSettings {
    pub browser: BrowserFlavor,
    pub poll_interval_ms: u64,
    /// Try the extension bridge before OS automation.
    pub prefer_extension: bool,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            browser: BrowserFlavor::Arc,
            poll_interval_ms: 1000,
            prefer_extension: true,
        }
    }
}

/// URL filter policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicySettings {
    pub blocked_prefixes: Vec<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            blocked_prefixes: Self::default_blocked_prefixes(),
        }
    }
}

impl PolicySettings {
    /// Schemes that denote browser chrome or extension internals.
    pub fn default_blocked_prefixes() -> Vec<String> {
        [
            "chrome://",
            "chrome-extension://",
            "chrome-search://",
            "chrome-untrusted://",
            "devtools://",
            "edge://",
            "brave://",
            "arc://",
            "about:",
            "view-source:",
            "moz-extension://",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}
