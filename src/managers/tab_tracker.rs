//! Browser-side tab tracker for TabTrail.
//!
//! Owns the browser's Recency List and reacts to tab events and runtime
//! messages. Every mutation updates the in-memory list first, then the local
//! store, then queues a push to the local server. Pushes are delivered in
//! order by a single background task, started on the first push.

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::managers::recency_list::RecencyList;
use crate::services::history_store::HistoryStore;
use crate::services::server_client::{PushJob, PushQueue, ServerClient};
use crate::services::tab_resolver::TabResolver;
use crate::services::url_policy::UrlPolicy;
use crate::types::errors::PersistenceError;
use crate::types::focus::FocusOutcome;
use crate::types::message::{RuntimeMessage, TabEvent};
use crate::types::settings::PushMode;
use crate::types::tab::{now_millis, BrowserTab, TabRecord, TabUpdate};

/// Load status that marks a finished navigation.
const STATUS_COMPLETE: &str = "complete";

pub struct TabTracker {
    list: RecencyList,
    policy: UrlPolicy,
    store: HistoryStore,
    client: Option<ServerClient>,
    pushes: Option<PushQueue>,
    push_mode: PushMode,
    resolver: Option<TabResolver>,
}

impl TabTracker {
    pub fn new(store: HistoryStore, policy: UrlPolicy, capacity: usize) -> Self {
        Self {
            list: RecencyList::new(capacity),
            policy,
            store,
            client: None,
            pushes: None,
            push_mode: PushMode::Full,
            resolver: None,
        }
    }

    /// Pushes every change to the local server using `mode`.
    pub fn with_client(mut self, client: ServerClient, mode: PushMode) -> Self {
        self.client = Some(client);
        self.push_mode = mode;
        self
    }

    pub fn with_resolver(mut self, resolver: TabResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn list(&self) -> &RecencyList {
        &self.list
    }

    pub fn policy(&self) -> &UrlPolicy {
        &self.policy
    }

    /// Restores the list from the local store. Returns the restored count.
    pub fn load(&mut self) -> usize {
        let records = self.store.load();
        self.list.replace(
            records
                .into_iter()
                .filter(|r| self.policy.allows(&r.url))
                .collect(),
        );
        info!(count = self.list.len(), "Restored tab history");
        self.list.len()
    }

    /// Applies one browser tab event. Returns whether anything was recorded.
    pub fn handle_event(&mut self, event: TabEvent) -> bool {
        match event {
            TabEvent::Activated(tab) => self.record_visit(&tab),
            TabEvent::Updated { tab, status } => {
                if status.as_deref() == Some(STATUS_COMPLETE) && tab.active {
                    self.record_visit(&tab)
                } else {
                    false
                }
            }
            TabEvent::Created(tab) => tab.active && self.record_visit(&tab),
        }
    }

    /// Records `tab` as visited now if its URL passes the filter.
    pub fn record_visit(&mut self, tab: &BrowserTab) -> bool {
        if !self.policy.allows_opt(tab.url.as_deref()) {
            debug!(tab_id = tab.id, "Ignoring tab with filtered url");
            return false;
        }
        let record = match self.list.record_access(tab.to_record()) {
            Ok(record) => record.clone(),
            Err(e) => {
                warn!(tab_id = tab.id, error = %e, "Rejected tab record");
                return false;
            }
        };
        debug!(url = %record.url, total = self.list.len(), "Recorded tab visit");
        self.persist();
        self.push_changed(&record);
        true
    }

    /// Sends the browser's full set of open tabs to the local server, so
    /// launcher-side focusing only matches tabs that still exist. The
    /// browser side calls this after tabs are created, removed or activated.
    pub fn report_open_tabs(&mut self, tabs: &[BrowserTab]) {
        self.enqueue(PushJob::OpenTabs(tabs.to_vec()));
    }

    /// Recency list minus the active tab.
    pub fn history(&self, active_url: Option<&str>) -> Vec<TabRecord> {
        self.list.view_excluding(active_url)
    }

    /// Empties the list everywhere it is kept.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.list.clear();
        self.store.clear()?;
        self.push_full();
        info!("Tab history cleared");
        Ok(())
    }

    /// Answers one runtime message. Failures are reported in the reply.
    pub async fn handle_message(&mut self, message: RuntimeMessage, active_url: Option<&str>) -> Value {
        match message {
            RuntimeMessage::GetTabHistory => json!({ "tabs": self.history(active_url) }),
            RuntimeMessage::ClearHistory => match self.clear() {
                Ok(()) => json!({ "success": true }),
                Err(e) => json!({ "success": false, "error": e.to_string() }),
            },
            RuntimeMessage::FocusTab { tab_id, url } => {
                let url = url
                    .filter(|u| !u.is_empty())
                    .or_else(|| self.list.find_by_id(tab_id).map(|r| r.url.clone()))
                    .unwrap_or_default();
                let outcome = match &self.resolver {
                    Some(resolver) => resolver.focus_or_open(&url, Some(tab_id)).await,
                    None => {
                        warn!(tab_id, "No tab resolver configured");
                        FocusOutcome::Failed
                    }
                };
                json!({ "success": outcome.is_success(), "outcome": outcome })
            }
            RuntimeMessage::PageVisible { tab } => {
                let recorded = self.record_visit(&tab);
                json!({ "success": recorded })
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.list.entries()) {
            warn!(error = %e, "Failed to persist tab history");
        }
    }

    fn push_changed(&mut self, record: &TabRecord) {
        match self.push_mode {
            PushMode::Full => self.push_full(),
            PushMode::Incremental => self.enqueue(PushJob::Updates {
                updates: vec![TabUpdate::from(record)],
                timestamp: now_millis(),
            }),
        }
    }

    fn push_full(&mut self) {
        let tabs = self.list.entries().to_vec();
        self.enqueue(PushJob::Tabs(tabs));
    }

    fn enqueue(&mut self, job: PushJob) {
        if self.client.is_none() {
            return;
        }
        if self.pushes.is_none() {
            self.pushes = self.client.clone().and_then(PushQueue::spawn);
        }
        match self.pushes.as_ref().map(|queue| queue.push(job)) {
            Some(true) => {}
            Some(false) => {
                debug!("Push queue closed, dropping push");
                self.pushes = None;
            }
            None => debug!("No async runtime, skipping push"),
        }
    }
}
