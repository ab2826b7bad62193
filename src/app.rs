//! App Core for TabTrail.
//!
//! Holds the loaded settings and builds every component from them, so the
//! binary and the tests wire things up the same way.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::http_handler::ServerState;
use crate::managers::history_manager::HistoryManager;
use crate::managers::recency_list::RecencyList;
use crate::managers::tab_tracker::TabTracker;
use crate::services::automation::{select_automation, AppleScriptAutomation, OpenOnlyAutomation, TabAutomation};
use crate::services::history_store::HistoryStore;
use crate::services::server_client::ServerClient;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::tab_resolver::TabResolver;
use crate::services::url_policy::UrlPolicy;
use crate::types::errors::SettingsError;
use crate::types::settings::TrailSettings;

/// Central application struct: settings plus the pieces shared by every command.
pub struct App {
    pub settings: TrailSettings,
    pub policy: UrlPolicy,
    pub client: ServerClient,
}

impl App {
    pub fn new(settings: TrailSettings) -> Self {
        let policy = UrlPolicy::from_settings(&settings.policy);
        let client = ServerClient::from_settings(&settings.server);
        Self {
            settings,
            policy,
            client,
        }
    }

    /// Loads settings through the settings engine (file, then environment).
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, SettingsError> {
        let mut engine = SettingsEngine::new(config_path);
        let settings = engine.load()?;
        Ok(Self::new(settings))
    }

    /// The shared history file.
    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::new(&self.settings.storage.history_file)
    }

    pub fn server_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.settings.server.host, self.settings.server.port).parse()
    }

    pub fn server_state(&self) -> ServerState {
        ServerState::new(self.history_store(), self.policy.clone(), RecencyList::DEFAULT_CAPACITY)
    }

    /// Browser-side tracker pushing to the configured server.
    pub fn tracker(&self) -> TabTracker {
        TabTracker::new(
            HistoryStore::new(&self.settings.storage.tracker_store_file),
            self.policy.clone(),
            self.settings.history.tracker_capacity,
        )
        .with_client(self.client.clone(), self.settings.history.push_mode)
    }

    pub fn history_manager(&self) -> HistoryManager {
        HistoryManager::new(
            &self.settings.storage.launcher_cache_file,
            self.history_store(),
            self.settings.history.launcher_capacity,
        )
    }

    /// Resolver over the best automation backend available right now.
    pub async fn resolver(&self) -> TabResolver {
        TabResolver::new(select_automation(&self.settings.focus, Some(self.client.clone())).await)
    }

    /// Resolver for executing queued focus requests. The extension bridge is
    /// never used here, since it would queue the request again.
    pub async fn poll_resolver(&self) -> TabResolver {
        let applescript = AppleScriptAutomation::new(self.settings.focus.browser);
        let automation: Arc<dyn TabAutomation> = if applescript.is_available().await {
            Arc::new(applescript)
        } else {
            Arc::new(OpenOnlyAutomation)
        };
        TabResolver::new(automation)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings.focus.poll_interval_ms)
    }
}
