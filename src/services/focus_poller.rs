//! Focus poller: drains cross-process focus requests on a fixed interval.
//!
//! Each request names a browser tab id. The poller looks up that tab's URL
//! in the shared history file and runs focus-or-open with the id as hint.
//! Requests that are not newer than the last handled one are skipped, so a
//! duplicated or replayed poll response is harmless.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::services::focus_queue::FocusQueue;
use crate::services::history_store::HistoryStore;
use crate::services::server_client::ServerClient;
use crate::services::tab_resolver::TabResolver;
use crate::types::errors::PersistenceError;
use crate::types::focus::{FocusOutcome, FocusRequest};

/// Where pending focus requests come from.
#[async_trait]
pub trait FocusSource: Send + Sync {
    async fn next_request(&self) -> Result<Option<FocusRequest>, PersistenceError>;
}

#[async_trait]
impl FocusSource for ServerClient {
    async fn next_request(&self) -> Result<Option<FocusRequest>, PersistenceError> {
        self.poll_focus().await
    }
}

/// In-process queue shared with the server state.
#[async_trait]
impl FocusSource for Arc<Mutex<FocusQueue>> {
    async fn next_request(&self) -> Result<Option<FocusRequest>, PersistenceError> {
        Ok(self.lock().await.dequeue())
    }
}

pub struct FocusPoller<S: FocusSource> {
    source: S,
    resolver: TabResolver,
    store: HistoryStore,
    interval: Duration,
    last_handled: Option<u64>,
}

impl<S: FocusSource> FocusPoller<S> {
    pub fn new(source: S, resolver: TabResolver, store: HistoryStore, interval: Duration) -> Self {
        Self {
            source,
            resolver,
            store,
            interval: interval.max(Duration::from_millis(10)),
            last_handled: None,
        }
    }

    pub fn last_handled(&self) -> Option<u64> {
        self.last_handled
    }

    /// Fetches and handles at most one request.
    pub async fn poll_once(&mut self) -> Option<FocusOutcome> {
        match self.source.next_request().await {
            Ok(Some(request)) => self.handle(request).await,
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Focus poll failed");
                None
            }
        }
    }

    /// Handles one request, honoring the last-handled guard.
    pub async fn handle(&mut self, request: FocusRequest) -> Option<FocusOutcome> {
        let tab_id = request.tab_id?;
        if let (Some(id), Some(last)) = (request.request_id, self.last_handled) {
            if id <= last {
                debug!(request_id = id, last_handled = last, "Skipping stale focus request");
                return None;
            }
        }
        if let Some(id) = request.request_id {
            self.last_handled = Some(id);
        }

        let url = self
            .store
            .load()
            .into_iter()
            .find(|r| r.id == Some(tab_id))
            .map(|r| r.url)
            .unwrap_or_default();
        let outcome = self.resolver.focus_or_open(&url, Some(tab_id)).await;
        info!(tab_id, ?outcome, "Handled focus request");
        Some(outcome)
    }

    /// Polls until `cancel` fires. Missed ticks are skipped, not replayed.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_ms = self.interval.as_millis() as u64, "Focus poller started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
        info!("Focus poller stopped");
    }
}
