//! Structured tab automation through the browser extension.
//!
//! The launcher cannot call the browser's tab API directly; it asks the
//! local server instead. The tab set is the browser's last open-tab report
//! (`GET /live-tabs`), never the recency history, which still lists tabs
//! that have since closed. Activation
//! queues a `POST /focus-tab` request that the browser side picks up on its
//! next poll and performs as one window-then-tab activation.

use async_trait::async_trait;
use tracing::debug;

use super::{system_open, TabAutomation};
use crate::services::server_client::ServerClient;
use crate::types::errors::FocusError;
use crate::types::tab::LiveTab;

/// Extension bridge backed by the local server.
#[derive(Debug, Clone)]
pub struct ExtensionAutomation {
    client: ServerClient,
}

impl ExtensionAutomation {
    pub fn new(client: ServerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TabAutomation for ExtensionAutomation {
    fn name(&self) -> &'static str {
        "extension"
    }

    async fn is_available(&self) -> bool {
        self.client.health().await
    }

    /// Tabs open in the browser as of its last report. Without a report
    /// there is no live tab set to match against.
    async fn list_tabs(&self) -> Result<Vec<LiveTab>, FocusError> {
        let snapshot = self
            .client
            .fetch_live_tabs()
            .await
            .map_err(|e| FocusError::FocusFailed(e.to_string()))?
            .ok_or_else(|| FocusError::FocusFailed("browser has not reported its open tabs".to_string()))?;
        debug!(count = snapshot.tabs.len(), reported_at = snapshot.reported_at, "Fetched open tab report");
        Ok(snapshot.tabs)
    }

    /// The browser side raises the window as part of the queued request.
    async fn activate_window(&self, tab: &LiveTab) -> Result<(), FocusError> {
        debug!(tab_id = tab.id, "Window activation delegated to extension");
        Ok(())
    }

    async fn activate_tab(&self, tab: &LiveTab) -> Result<(), FocusError> {
        self.client
            .request_focus(tab.id)
            .await
            .map_err(|e| FocusError::FocusFailed(e.to_string()))
    }

    async fn open_url(&self, url: &str) -> Result<(), FocusError> {
        system_open(url).await
    }
}
