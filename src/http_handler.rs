//! Local HTTP server for TabTrail.
//!
//! Fronts the shared history file, the browser's open-tab report and the
//! focus-request queue on a loopback port. Routes are built by `router` so
//! they can be exercised without a socket; `serve` binds and runs them until
//! the shutdown token fires. File access runs on the blocking pool.
//!
//! Bodies are decoded by hand from raw bytes so malformed input is answered
//! with `400 {"error": ...}` rather than the extractor's plain-text rejection.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::managers::recency_list::RecencyList;
use crate::services::focus_queue::FocusQueue;
use crate::services::history_store::HistoryStore;
use crate::services::url_policy::UrlPolicy;
use crate::types::focus::FocusRequest;
use crate::types::errors::PersistenceError;
use crate::types::tab::{now_millis, LiveTab, LiveTabSnapshot, OpenTabsReport, RecencyUpdateBatch, TabHistoryFile};

/// Shared state behind every route.
#[derive(Clone)]
pub struct ServerState {
    store: HistoryStore,
    policy: Arc<UrlPolicy>,
    capacity: usize,
    focus_queue: Arc<Mutex<FocusQueue>>,
    /// Latest open-tab report; `None` until the browser side sends one.
    live_tabs: Arc<Mutex<Option<LiveTabSnapshot>>>,
    /// Serialises writes to the history file within this process.
    write_lock: Arc<Mutex<()>>,
}

impl ServerState {
    pub fn new(store: HistoryStore, policy: UrlPolicy, capacity: usize) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
            capacity: capacity.max(1),
            focus_queue: Arc::new(Mutex::new(FocusQueue::new())),
            live_tabs: Arc::new(Mutex::new(None)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Uses `queue` instead of a fresh one, e.g. to share it with an
    /// in-process poller.
    pub fn with_focus_queue(mut self, queue: Arc<Mutex<FocusQueue>>) -> Self {
        self.focus_queue = queue;
        self
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn focus_queue(&self) -> Arc<Mutex<FocusQueue>> {
        Arc::clone(&self.focus_queue)
    }

    pub async fn live_tabs(&self) -> Option<LiveTabSnapshot> {
        self.live_tabs.lock().await.clone()
    }
}

/// Builds the route table with CORS and request tracing.
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/tabs", post(handle_replace_tabs).get(handle_get_tabs))
        .route("/update-recency", post(handle_update_recency))
        .route("/live-tabs", post(handle_report_live_tabs).get(handle_get_live_tabs))
        .route("/focus-tab", post(handle_focus_tab))
        .route("/focus-tab-poll", get(handle_focus_poll))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until `shutdown` is cancelled.
pub async fn serve(state: ServerState, addr: SocketAddr, shutdown: CancellationToken) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state, shutdown).await
}

/// Serves on an already bound listener until `shutdown` is cancelled.
pub async fn serve_on(listener: TcpListener, state: ServerState, shutdown: CancellationToken) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, file = %state.store.path().display(), "Tab server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Tab server stopped");
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Runs blocking file access off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, PersistenceError>
where
    F: FnOnce() -> Result<T, PersistenceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| PersistenceError::Unavailable(format!("Storage task failed: {}", e)))?
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejecting malformed request body");
        error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
    })
}

/// POST /tabs: replaces the stored list.
async fn handle_replace_tabs(State(state): State<ServerState>, body: Bytes) -> Response {
    let file: TabHistoryFile = match parse_body(&body) {
        Ok(file) => file,
        Err(rejection) => return rejection,
    };
    if let Some(excluded) = &file.excluded_current_tab {
        debug!(excluded = %excluded, "Ignoring excludedCurrentTab");
    }

    let tabs = file
        .tabs
        .into_iter()
        .filter(|t| state.policy.allows(&t.url))
        .collect();
    let list = RecencyList::with_entries(tabs, state.capacity);
    let last_updated = if file.last_updated > 0 { file.last_updated } else { now_millis() };
    let normalised = TabHistoryFile::new(list.into_entries(), last_updated);
    let count = normalised.tabs.len();

    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    match run_blocking(move || store.save_file(&normalised)).await {
        Ok(()) => {
            info!(count, "Saved tab list");
            Json(json!({ "success": true, "count": count })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to save tab list");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /update-recency: merges partial updates into the stored list.
async fn handle_update_recency(State(state): State<ServerState>, body: Bytes) -> Response {
    let batch: RecencyUpdateBatch = match parse_body(&body) {
        Ok(batch) => batch,
        Err(rejection) => return rejection,
    };
    let updates: Vec<_> = batch
        .tab_updates
        .into_iter()
        .filter(|u| state.policy.allows(&u.url))
        .collect();
    let timestamp = batch.timestamp.unwrap_or_else(now_millis);
    let received = updates.len();

    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    let capacity = state.capacity;
    match run_blocking(move || store.update(&updates, timestamp, capacity)).await {
        Ok(tabs) => {
            info!(updates = received, total = tabs.len(), "Merged recency updates");
            Json(json!({ "success": true, "count": tabs.len() })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to merge recency updates");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /tabs: current file contents.
async fn handle_get_tabs(State(state): State<ServerState>) -> Json<TabHistoryFile> {
    let store = state.store.clone();
    let file = run_blocking(move || store.load_file()).await.unwrap_or_else(|e| {
        debug!(error = %e, "Serving empty tab list");
        TabHistoryFile::default()
    });
    Json(file)
}

/// POST /live-tabs: replaces the open-tab report. Tabs without a URL are
/// dropped; internal pages are kept since they are still open.
async fn handle_report_live_tabs(State(state): State<ServerState>, body: Bytes) -> Response {
    let report: OpenTabsReport = match parse_body(&body) {
        Ok(report) => report,
        Err(rejection) => return rejection,
    };
    let tabs: Vec<LiveTab> = report
        .tabs
        .iter()
        .map(LiveTab::from)
        .filter(|t| !t.url.is_empty())
        .collect();
    let count = tabs.len();
    let snapshot = LiveTabSnapshot {
        tabs,
        reported_at: report.timestamp.unwrap_or_else(now_millis),
    };
    *state.live_tabs.lock().await = Some(snapshot);
    debug!(count, "Updated open tab report");
    Json(json!({ "success": true, "count": count })).into_response()
}

/// GET /live-tabs: latest open-tab report, 404 before the first one.
async fn handle_get_live_tabs(State(state): State<ServerState>) -> Response {
    match state.live_tabs().await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No open tabs reported"),
    }
}

/// POST /focus-tab: queues a focus request.
async fn handle_focus_tab(State(state): State<ServerState>, body: Bytes) -> Response {
    let payload: Value = match parse_body(&body) {
        Ok(payload) => payload,
        Err(rejection) => return rejection,
    };
    let Some(tab_id) = payload.get("tabId").and_then(Value::as_i64) else {
        return error_response(StatusCode::BAD_REQUEST, "tabId must be a number");
    };

    let request = state.focus_queue.lock().await.enqueue(tab_id);
    info!(tab_id, request_id = ?request.request_id, "Queued focus request");
    Json(json!({ "success": true, "requestId": request.request_id })).into_response()
}

/// GET /focus-tab-poll: oldest pending request, or `{tabId: null}`.
async fn handle_focus_poll(State(state): State<ServerState>) -> Json<FocusRequest> {
    let request = state.focus_queue.lock().await.dequeue();
    Json(request.unwrap_or_else(FocusRequest::none))
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": now_millis() }))
}

async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
