//! Browser automation capabilities.
//!
//! `TabAutomation` abstracts the browser primitives the resolver needs:
//! enumerate open tabs, raise a window, activate a tab, open a URL. Which
//! implementation runs is decided at runtime by probing `is_available` in
//! preference order.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::platform;
use crate::services::server_client::ServerClient;
use crate::types::errors::FocusError;
use crate::types::settings::FocusSettings;
use crate::types::tab::LiveTab;

pub mod applescript;
pub mod extension;
pub mod open_only;

pub use applescript::AppleScriptAutomation;
pub use extension::ExtensionAutomation;
pub use open_only::OpenOnlyAutomation;

/// Browser tab primitives used to focus or open tabs.
#[async_trait]
pub trait TabAutomation: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;
    /// Runtime capability probe.
    async fn is_available(&self) -> bool;
    /// Snapshot of currently open tabs.
    async fn list_tabs(&self) -> Result<Vec<LiveTab>, FocusError>;
    /// Brings the window owning `tab` to the front.
    async fn activate_window(&self, tab: &LiveTab) -> Result<(), FocusError>;
    /// Makes `tab` the active tab of its window.
    async fn activate_tab(&self, tab: &LiveTab) -> Result<(), FocusError>;
    /// Opens `url` in a new tab or window.
    async fn open_url(&self, url: &str) -> Result<(), FocusError>;
}

/// Hands `url` to the platform's default URL opener.
pub async fn system_open(url: &str) -> Result<(), FocusError> {
    let (program, args) = platform::system_open_command();
    let status = Command::new(program)
        .args(args)
        .arg(url)
        .status()
        .await
        .map_err(|e| FocusError::FocusFailed(format!("Failed to run {}: {}", program, e)))?;
    if status.success() {
        Ok(())
    } else {
        Err(FocusError::FocusFailed(format!("{} exited with {}", program, status)))
    }
}

/// Picks the first available automation backend.
///
/// Order: the extension bridge (when preferred and the server answers), then
/// AppleScript for the configured browser, then open-only.
pub async fn select_automation(
    settings: &FocusSettings,
    client: Option<ServerClient>,
) -> Arc<dyn TabAutomation> {
    let mut candidates: Vec<Arc<dyn TabAutomation>> = Vec::new();
    if settings.prefer_extension {
        if let Some(client) = client {
            candidates.push(Arc::new(ExtensionAutomation::new(client)));
        }
    }
    candidates.push(Arc::new(AppleScriptAutomation::new(settings.browser)));

    for candidate in candidates {
        if candidate.is_available().await {
            info!(backend = candidate.name(), "Selected tab automation");
            return candidate;
        }
        debug!(backend = candidate.name(), "Automation backend unavailable");
    }
    info!(backend = "open-only", "No tab automation available, URLs will open in new tabs");
    Arc::new(OpenOnlyAutomation)
}
