use serde::{Deserialize, Serialize};

use super::tab::BrowserTab;

/// Runtime messages handled by the browser-side tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeMessage {
    GetTabHistory,
    ClearHistory,
    #[serde(rename_all = "camelCase")]
    FocusTab {
        tab_id: i64,
        #[serde(default)]
        url: Option<String>,
    },
    PageVisible {
        tab: BrowserTab,
    },
}

/// Browser tab lifecycle events the tracker reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    Activated(BrowserTab),
    /// `status` is the browser's load status in the change info, e.g. `"complete"`.
    Updated {
        tab: BrowserTab,
        status: Option<String>,
    },
    Created(BrowserTab),
}
