//! Unit tests for the FocusPoller.
//!
//! Requests come from an in-process `FocusQueue`; the shared history file
//! supplies URLs by tab id and a recording automation executes the focus.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tabtrail::services::automation::TabAutomation;
use tabtrail::services::focus_poller::FocusPoller;
use tabtrail::services::focus_queue::FocusQueue;
use tabtrail::services::history_store::HistoryStore;
use tabtrail::services::tab_resolver::TabResolver;
use tabtrail::types::errors::FocusError;
use tabtrail::types::focus::{FocusOutcome, FocusRequest};
use tabtrail::types::tab::{LiveTab, TabRecord};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingAutomation {
    tabs: Vec<LiveTab>,
    activated: StdMutex<Vec<i64>>,
    opened: StdMutex<Vec<String>>,
}

#[async_trait]
impl TabAutomation for RecordingAutomation {
    fn name(&self) -> &'static str {
        "recording"
    }
    async fn is_available(&self) -> bool {
        true
    }
    async fn list_tabs(&self) -> Result<Vec<LiveTab>, FocusError> {
        Ok(self.tabs.clone())
    }
    async fn activate_window(&self, _tab: &LiveTab) -> Result<(), FocusError> {
        Ok(())
    }
    async fn activate_tab(&self, tab: &LiveTab) -> Result<(), FocusError> {
        self.activated.lock().unwrap().push(tab.id);
        Ok(())
    }
    async fn open_url(&self, url: &str) -> Result<(), FocusError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

type Queue = Arc<Mutex<FocusQueue>>;

/// Helper: a poller over a fresh queue, with one live tab (id 4) and a
/// shared file mapping ids 4 and 8 to URLs.
fn setup() -> (TempDir, Queue, Arc<RecordingAutomation>, FocusPoller<Queue>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = HistoryStore::new(dir.path().join("shared.json"));
    store
        .save(&[
            TabRecord::new("https://live.com", "Live").with_id(4).with_last_accessed(20),
            TabRecord::new("https://closed.com", "Closed").with_id(8).with_last_accessed(10),
        ])
        .unwrap();

    let automation = Arc::new(RecordingAutomation {
        tabs: vec![LiveTab {
            id: 4,
            title: "Live".to_string(),
            url: "https://live.com".to_string(),
            ..LiveTab::default()
        }],
        ..RecordingAutomation::default()
    });
    let queue: Queue = Arc::new(Mutex::new(FocusQueue::starting_at(1)));
    let poller = FocusPoller::new(
        queue.clone(),
        TabResolver::new(automation.clone()),
        store,
        Duration::from_millis(10),
    );
    (dir, queue, automation, poller)
}

#[tokio::test]
async fn test_empty_queue_yields_nothing() {
    let (_dir, _queue, automation, mut poller) = setup();
    assert_eq!(poller.poll_once().await, None);
    assert!(automation.activated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_for_live_tab_focuses_it() {
    let (_dir, queue, automation, mut poller) = setup();
    queue.lock().await.enqueue(4);

    assert_eq!(poller.poll_once().await, Some(FocusOutcome::Focused));
    assert_eq!(*automation.activated.lock().unwrap(), vec![4]);
    assert_eq!(poller.last_handled(), Some(1));
}

#[tokio::test]
async fn test_request_for_closed_tab_reopens_its_url() {
    let (_dir, queue, automation, mut poller) = setup();
    queue.lock().await.enqueue(8);

    assert_eq!(poller.poll_once().await, Some(FocusOutcome::Opened));
    assert_eq!(*automation.opened.lock().unwrap(), vec!["https://closed.com".to_string()]);
}

#[tokio::test]
async fn test_requests_are_handled_in_fifo_order() {
    let (_dir, queue, automation, mut poller) = setup();
    {
        let mut queue = queue.lock().await;
        queue.enqueue(8);
        queue.enqueue(4);
    }
    poller.poll_once().await;
    poller.poll_once().await;
    assert_eq!(*automation.opened.lock().unwrap(), vec!["https://closed.com".to_string()]);
    assert_eq!(*automation.activated.lock().unwrap(), vec![4]);
    assert_eq!(poller.last_handled(), Some(2));
}

#[tokio::test]
async fn test_stale_or_duplicate_request_is_skipped() {
    let (_dir, _queue, automation, mut poller) = setup();
    let request = FocusRequest {
        tab_id: Some(4),
        request_id: Some(10),
    };

    assert!(poller.handle(request).await.is_some());
    assert_eq!(poller.handle(request).await, None);
    let older = FocusRequest {
        tab_id: Some(4),
        request_id: Some(9),
    };
    assert_eq!(poller.handle(older).await, None);
    assert_eq!(automation.activated.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_request_without_tab_is_ignored() {
    let (_dir, _queue, _automation, mut poller) = setup();
    assert_eq!(poller.handle(FocusRequest::none()).await, None);
    assert_eq!(poller.last_handled(), None);
}

#[tokio::test]
async fn test_run_stops_when_cancelled() {
    let (_dir, queue, automation, poller) = setup();
    queue.lock().await.enqueue(4);

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(poller.run(cancel.clone()));
    for _ in 0..100 {
        if !automation.activated.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("poller did not stop")
        .unwrap();
    assert_eq!(*automation.activated.lock().unwrap(), vec![4]);
    assert!(queue.lock().await.is_empty());
}
