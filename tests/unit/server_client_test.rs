//! Client-side tests against a running local server.
//!
//! Each test binds the router on an ephemeral loopback port, then drives it
//! through `ServerClient`, the extension automation backend and the
//! browser-side tracker's push queue.

use std::time::Duration;

use tabtrail::http_handler::{serve_on, ServerState};
use tabtrail::managers::tab_tracker::TabTracker;
use tabtrail::services::automation::{ExtensionAutomation, TabAutomation};
use tabtrail::services::history_store::HistoryStore;
use tabtrail::services::server_client::{PushJob, PushQueue, ServerClient};
use tabtrail::services::url_policy::UrlPolicy;
use tabtrail::types::message::TabEvent;
use tabtrail::types::settings::PushMode;
use tabtrail::types::tab::{BrowserTab, TabRecord};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

struct Harness {
    dir: TempDir,
    state: ServerState,
    client: ServerClient,
    shutdown: CancellationToken,
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Helper: a server on 127.0.0.1 with an ephemeral port and a client for it.
async fn setup() -> Harness {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let state = ServerState::new(
        HistoryStore::new(dir.path().join("server.json")),
        UrlPolicy::default(),
        50,
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(serve_on(listener, state.clone(), shutdown.clone()));
    let client = ServerClient::new(&format!("http://{}", addr), Duration::from_secs(2));
    Harness {
        dir,
        state,
        client,
        shutdown,
    }
}

fn tab(id: i64, url: &str, active: bool) -> BrowserTab {
    BrowserTab {
        id,
        url: Some(url.to_string()),
        title: Some(format!("Tab {}", id)),
        active,
        ..BrowserTab::default()
    }
}

/// Polls `check` until it holds or two seconds pass.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_client_round_trips_tabs_and_focus_requests() {
    let h = setup().await;
    assert!(h.client.health().await);

    h.client
        .push_tabs(&[TabRecord::new("https://a.com", "A").with_id(1).with_last_accessed(100)])
        .await
        .unwrap();
    let file = h.client.fetch_tabs().await.unwrap();
    assert_eq!(file.tabs.len(), 1);
    assert_eq!(file.tabs[0].url, "https://a.com");

    h.client.request_focus(1).await.unwrap();
    let request = h.client.poll_focus().await.unwrap().unwrap();
    assert_eq!(request.tab_id, Some(1));
    assert_eq!(h.client.poll_focus().await.unwrap(), None);
}

#[tokio::test]
async fn test_extension_backend_without_report_has_no_tabs() {
    let h = setup().await;
    h.client
        .push_tabs(&[TabRecord::new("https://a.com", "A").with_id(1).with_last_accessed(100)])
        .await
        .unwrap();

    let automation = ExtensionAutomation::new(h.client.clone());
    assert!(automation.is_available().await);
    assert!(automation.list_tabs().await.is_err());
}

#[tokio::test]
async fn test_extension_backend_lists_open_tabs_not_history() {
    let h = setup().await;
    h.client
        .push_tabs(&[
            TabRecord::new("https://closed.com", "Closed").with_id(5).with_last_accessed(200),
            TabRecord::new("https://open.com", "Open").with_id(6).with_last_accessed(100),
        ])
        .await
        .unwrap();
    h.client
        .report_open_tabs(&[tab(6, "https://open.com", false), tab(7, "https://current.com", true)])
        .await
        .unwrap();

    let automation = ExtensionAutomation::new(h.client.clone());
    let tabs = automation.list_tabs().await.unwrap();
    let urls: Vec<_> = tabs.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(urls, vec!["https://open.com", "https://current.com"]);
    assert!(tabs[1].active);
    assert!(!tabs.iter().any(|t| t.id == 5));
}

#[tokio::test]
async fn test_extension_activation_queues_focus_request() {
    let h = setup().await;
    h.client.report_open_tabs(&[tab(6, "https://open.com", false)]).await.unwrap();
    let automation = ExtensionAutomation::new(h.client.clone());
    let tabs = automation.list_tabs().await.unwrap();

    automation.activate_tab(&tabs[0]).await.unwrap();
    let request = h.state.focus_queue().lock().await.dequeue().unwrap();
    assert_eq!(request.tab_id, Some(6));
}

#[tokio::test]
async fn test_push_queue_delivers_in_submission_order() {
    let h = setup().await;
    let queue = PushQueue::spawn(h.client.clone()).unwrap();
    for n in 1..=20 {
        let tabs: Vec<_> = (0..n)
            .map(|i| TabRecord::new(&format!("https://site{}.com", i), "T").with_last_accessed(1_000 - i))
            .collect();
        assert!(queue.push(PushJob::Tabs(tabs)));
    }

    let store = h.state.store().clone();
    assert!(eventually(|| {
        let store = store.clone();
        async move { store.load().len() == 20 }
    })
    .await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.load().len(), 20);
}

#[tokio::test]
async fn test_tracker_pushes_keep_server_in_step() {
    let h = setup().await;
    let local = HistoryStore::new(h.dir.path().join("tracker.json"));
    let mut tracker = TabTracker::new(local, UrlPolicy::default(), 50).with_client(h.client.clone(), PushMode::Full);

    for (id, url) in ["https://a.com", "https://b.com", "https://c.com", "https://a.com"].iter().enumerate() {
        assert!(tracker.handle_event(TabEvent::Activated(tab(id as i64, url, true))));
    }
    let expected: Vec<String> = tracker.list().entries().iter().map(|r| r.url.clone()).collect();
    assert_eq!(expected, vec!["https://a.com", "https://c.com", "https://b.com"]);

    let store = h.state.store().clone();
    let want = expected.clone();
    assert!(eventually(|| {
        let store = store.clone();
        let want = want.clone();
        async move { store.load().iter().map(|r| r.url.clone()).collect::<Vec<_>>() == want }
    })
    .await);
}

#[tokio::test]
async fn test_tracker_reports_open_tabs() {
    let h = setup().await;
    let local = HistoryStore::new(h.dir.path().join("tracker.json"));
    let mut tracker = TabTracker::new(local, UrlPolicy::default(), 50).with_client(h.client.clone(), PushMode::Full);

    tracker.report_open_tabs(&[tab(1, "https://a.com", true), tab(2, "https://b.com", false)]);

    let state = h.state.clone();
    assert!(eventually(|| {
        let state = state.clone();
        async move { state.live_tabs().await.map_or(0, |s| s.tabs.len()) == 2 }
    })
    .await);
}
