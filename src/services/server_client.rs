//! HTTP client for the local TabTrail server.
//!
//! Every call is bounded by the configured timeout and reports failures as
//! `PersistenceError::Unavailable`; callers treat an unreachable server as a
//! normal condition. `PushQueue` delivers pushes off the caller's path, one
//! at a time and in submission order.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::errors::PersistenceError;
use crate::types::focus::FocusRequest;
use crate::types::settings::ServerSettings;
use crate::types::tab::{
    now_millis, BrowserTab, LiveTabSnapshot, OpenTabsReport, RecencyUpdateBatch, TabHistoryFile, TabRecord,
    TabUpdate,
};

/// Thin JSON client for the loopback server.
#[derive(Debug, Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self::new(
            &settings.base_url(),
            Duration::from_millis(settings.request_timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PersistenceError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| PersistenceError::Unavailable(format!("GET {}: {}", path, e)))?;
        if !response.status().is_success() {
            return Err(PersistenceError::Unavailable(format!(
                "GET {} returned {}",
                path,
                response.status()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PersistenceError::DecodeFailed(format!("GET {}: {}", path, e)))
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, PersistenceError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| PersistenceError::Unavailable(format!("POST {}: {}", path, e)))?;
        if !response.status().is_success() {
            return Err(PersistenceError::Unavailable(format!(
                "POST {} returned {}",
                path,
                response.status()
            )));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| PersistenceError::DecodeFailed(format!("POST {}: {}", path, e)))
    }

    /// Liveness probe. Any failure reads as "not healthy".
    pub async fn health(&self) -> bool {
        match self.get_json::<Value>("/health").await {
            Ok(body) => body.get("status").and_then(|s| s.as_str()) == Some("ok"),
            Err(e) => {
                debug!(error = %e, "Local server not available");
                false
            }
        }
    }

    /// Replaces the server's list with `tabs`.
    pub async fn push_tabs(&self, tabs: &[TabRecord]) -> Result<(), PersistenceError> {
        let body = TabHistoryFile::new(tabs.to_vec(), now_millis());
        self.post_json("/tabs", &body).await?;
        Ok(())
    }

    /// Merges partial updates into the server's list.
    pub async fn push_updates(&self, updates: &[TabUpdate], timestamp: i64) -> Result<(), PersistenceError> {
        let body = RecencyUpdateBatch {
            tab_updates: updates.to_vec(),
            timestamp: Some(timestamp),
        };
        self.post_json("/update-recency", &body).await?;
        Ok(())
    }

    /// Current contents of the server's history file.
    pub async fn fetch_tabs(&self) -> Result<TabHistoryFile, PersistenceError> {
        self.get_json("/tabs").await
    }

    /// Replaces the server's report of tabs open in the browser.
    pub async fn report_open_tabs(&self, tabs: &[BrowserTab]) -> Result<(), PersistenceError> {
        let body = OpenTabsReport {
            tabs: tabs.to_vec(),
            timestamp: Some(now_millis()),
        };
        self.post_json("/live-tabs", &body).await?;
        Ok(())
    }

    /// Latest open-tab report, or `None` if the browser side never sent one.
    pub async fn fetch_live_tabs(&self) -> Result<Option<LiveTabSnapshot>, PersistenceError> {
        let response = self
            .http
            .get(self.url("/live-tabs"))
            .send()
            .await
            .map_err(|e| PersistenceError::Unavailable(format!("GET /live-tabs: {}", e)))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PersistenceError::Unavailable(format!(
                "GET /live-tabs returned {}",
                response.status()
            )));
        }
        response
            .json::<LiveTabSnapshot>()
            .await
            .map(Some)
            .map_err(|e| PersistenceError::DecodeFailed(format!("GET /live-tabs: {}", e)))
    }

    /// Queues a request for the browser side to focus `tab_id`.
    pub async fn request_focus(&self, tab_id: i64) -> Result<(), PersistenceError> {
        self.post_json("/focus-tab", &json!({ "tabId": tab_id })).await?;
        Ok(())
    }

    /// Takes the oldest pending focus request, if any.
    pub async fn poll_focus(&self) -> Result<Option<FocusRequest>, PersistenceError> {
        let request: FocusRequest = self.get_json("/focus-tab-poll").await?;
        Ok(request.tab_id.map(|_| request))
    }
}

/// One push to the local server.
#[derive(Debug, Clone, PartialEq)]
pub enum PushJob {
    /// Replace the stored list.
    Tabs(Vec<TabRecord>),
    /// Merge partial updates.
    Updates { updates: Vec<TabUpdate>, timestamp: i64 },
    /// Replace the open-tab report.
    OpenTabs(Vec<BrowserTab>),
}

impl PushJob {
    fn label(&self) -> &'static str {
        match self {
            PushJob::Tabs(_) => "push-tabs",
            PushJob::Updates { .. } => "push-updates",
            PushJob::OpenTabs(_) => "report-open-tabs",
        }
    }

    async fn send(self, client: &ServerClient) -> Result<(), PersistenceError> {
        match self {
            PushJob::Tabs(tabs) => client.push_tabs(&tabs).await,
            PushJob::Updates { updates, timestamp } => client.push_updates(&updates, timestamp).await,
            PushJob::OpenTabs(tabs) => client.report_open_tabs(&tabs).await,
        }
    }
}

/// Sender half of a single delivery task. Jobs reach the server in the
/// order they were pushed, so an older list never overwrites a newer one.
#[derive(Debug, Clone)]
pub struct PushQueue {
    tx: mpsc::UnboundedSender<PushJob>,
}

impl PushQueue {
    /// Starts the delivery task on the current Tokio runtime. Returns `None`
    /// outside a runtime.
    pub fn spawn(client: ServerClient) -> Option<Self> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(deliver(client, rx));
        Some(Self { tx })
    }

    /// Enqueues `job`. Returns false once the delivery task is gone.
    pub fn push(&self, job: PushJob) -> bool {
        self.tx.send(job).is_ok()
    }
}

async fn deliver(client: ServerClient, mut rx: mpsc::UnboundedReceiver<PushJob>) {
    while let Some(job) = rx.recv().await {
        let label = job.label();
        if let Err(e) = job.send(&client).await {
            debug!(task = label, error = %e, "Push to local server failed");
        }
    }
    debug!("Push queue closed");
}
