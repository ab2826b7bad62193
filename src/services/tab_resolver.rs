//! Tab Resolver/Focuser.
//!
//! Finds an open tab for a URL (or a tab id hint) and activates it, falling
//! back to opening the URL. Never returns an error: the worst outcome is
//! `FocusOutcome::Failed`, reported only when even opening is impossible.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::services::automation::TabAutomation;
use crate::types::errors::FocusError;
use crate::types::focus::FocusOutcome;
use crate::types::tab::LiveTab;

/// Focus-or-open over a pluggable automation backend.
#[derive(Clone)]
pub struct TabResolver {
    automation: Arc<dyn TabAutomation>,
}

impl TabResolver {
    pub fn new(automation: Arc<dyn TabAutomation>) -> Self {
        Self { automation }
    }

    pub fn automation(&self) -> &Arc<dyn TabAutomation> {
        &self.automation
    }

    /// Live tab snapshot; a failing backend yields an empty snapshot.
    pub async fn live_tabs(&self) -> Vec<LiveTab> {
        match self.automation.list_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(backend = self.automation.name(), error = %e, "Could not list open tabs");
                Vec::new()
            }
        }
    }

    /// Focuses the tab showing `url`, preferring the tab with id `hint`.
    ///
    /// The hint is trusted only if it resolves to a live tab whose URL is
    /// `url` (or `url` is empty), since tab ids are reused across browser
    /// restarts. With no live match the URL is opened.
    pub async fn focus_or_open(&self, url: &str, hint: Option<i64>) -> FocusOutcome {
        let tabs = self.live_tabs().await;

        if let Some(tab_id) = hint {
            match tabs.iter().find(|t| t.id == tab_id) {
                Some(tab) if url.is_empty() || tab.url == url => {
                    if self.activate(tab).await.is_ok() {
                        info!(tab_id, "Focused tab by id");
                        return FocusOutcome::Focused;
                    }
                }
                Some(tab) => debug!(tab_id, live_url = %tab.url, "Tab id now shows another URL, ignoring hint"),
                None => debug!(tab_id, "Tab id no longer live, searching by URL"),
            }
        }

        if !url.is_empty() {
            for tab in tabs.iter().filter(|t| t.url == url && Some(t.id) != hint) {
                if self.activate(tab).await.is_ok() {
                    info!(tab_id = tab.id, url, "Focused tab by URL");
                    return FocusOutcome::Focused;
                }
            }
        }

        self.open(url).await
    }

    /// Raises the owning window, then activates the tab. A window failure is
    /// logged and does not stop tab activation; the result is the tab's.
    pub async fn activate(&self, tab: &LiveTab) -> Result<(), FocusError> {
        if let Err(e) = self.automation.activate_window(tab).await {
            debug!(tab_id = tab.id, error = %e, "Window activation failed, still activating tab");
        }
        self.automation.activate_tab(tab).await.map_err(|e| {
            warn!(tab_id = tab.id, error = %e, "Tab activation failed");
            e
        })
    }

    async fn open(&self, url: &str) -> FocusOutcome {
        if url.is_empty() {
            warn!("Nothing to focus and no URL to open");
            return FocusOutcome::Failed;
        }
        match self.automation.open_url(url).await {
            Ok(()) => {
                info!(url, "Opened URL in new tab");
                FocusOutcome::Opened
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to open URL");
                FocusOutcome::Failed
            }
        }
    }
}
