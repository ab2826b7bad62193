//! Unit tests for the TabResolver focus-or-open logic.
//!
//! A scripted automation backend stands in for the browser, recording every
//! window raise, tab activation and URL open.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tabtrail::services::automation::{OpenOnlyAutomation, TabAutomation};
use tabtrail::services::tab_resolver::TabResolver;
use tabtrail::types::errors::FocusError;
use tabtrail::types::focus::FocusOutcome;
use tabtrail::types::tab::LiveTab;

#[derive(Default)]
struct ScriptedAutomation {
    tabs: Vec<LiveTab>,
    fail_listing: bool,
    fail_window: bool,
    /// Tab ids whose activation fails.
    broken_tabs: Vec<i64>,
    fail_open: bool,
    windows_raised: Mutex<Vec<i64>>,
    activated: Mutex<Vec<i64>>,
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl TabAutomation for ScriptedAutomation {
    fn name(&self) -> &'static str {
        "scripted"
    }
    async fn is_available(&self) -> bool {
        true
    }
    async fn list_tabs(&self) -> Result<Vec<LiveTab>, FocusError> {
        if self.fail_listing {
            return Err(FocusError::FocusFailed("browser not running".to_string()));
        }
        Ok(self.tabs.clone())
    }
    async fn activate_window(&self, tab: &LiveTab) -> Result<(), FocusError> {
        if self.fail_window {
            return Err(FocusError::FocusFailed("window gone".to_string()));
        }
        self.windows_raised.lock().unwrap().push(tab.id);
        Ok(())
    }
    async fn activate_tab(&self, tab: &LiveTab) -> Result<(), FocusError> {
        if self.broken_tabs.contains(&tab.id) {
            return Err(FocusError::FocusFailed(format!("tab {} refused", tab.id)));
        }
        self.activated.lock().unwrap().push(tab.id);
        Ok(())
    }
    async fn open_url(&self, url: &str) -> Result<(), FocusError> {
        if self.fail_open {
            return Err(FocusError::FocusFailed("no opener".to_string()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn live(id: i64, url: &str) -> LiveTab {
    LiveTab {
        id,
        window_id: Some("1".to_string()),
        title: format!("Tab {}", id),
        url: url.to_string(),
        ..LiveTab::default()
    }
}

/// Helper: resolver over `automation`, keeping a handle for assertions.
fn setup(automation: ScriptedAutomation) -> (Arc<ScriptedAutomation>, TabResolver) {
    let automation = Arc::new(automation);
    let resolver = TabResolver::new(automation.clone());
    (automation, resolver)
}

#[tokio::test]
async fn test_no_match_opens_exactly_once() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(1, "https://other.com")],
        ..ScriptedAutomation::default()
    });

    let outcome = resolver.focus_or_open("https://x.com", None).await;
    assert_eq!(outcome, FocusOutcome::Opened);
    assert_eq!(*automation.opened.lock().unwrap(), vec!["https://x.com".to_string()]);
    assert!(automation.activated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_url_match_is_focused() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(1, "https://a.com"), live(2, "https://x.com")],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("https://x.com", None).await, FocusOutcome::Focused);
    assert_eq!(*automation.windows_raised.lock().unwrap(), vec![2]);
    assert_eq!(*automation.activated.lock().unwrap(), vec![2]);
    assert!(automation.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_hint_wins_over_other_url_matches() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(1, "https://x.com"), live(2, "https://x.com")],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("https://x.com", Some(2)).await, FocusOutcome::Focused);
    assert_eq!(*automation.activated.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn test_stale_hint_falls_back_to_url_search() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(5, "https://x.com")],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("https://x.com", Some(99)).await, FocusOutcome::Focused);
    assert_eq!(*automation.activated.lock().unwrap(), vec![5]);
}

#[tokio::test]
async fn test_stale_hint_without_match_opens() {
    let (automation, resolver) = setup(ScriptedAutomation::default());

    assert_eq!(resolver.focus_or_open("https://x.com", Some(99)).await, FocusOutcome::Opened);
    assert_eq!(automation.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reused_hint_id_showing_other_url_is_ignored() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(7, "https://unrelated.com")],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("https://x.com", Some(7)).await, FocusOutcome::Opened);
    assert!(automation.activated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_hint_alone_focuses_when_url_unknown() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(7, "https://anything.com")],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("", Some(7)).await, FocusOutcome::Focused);
    assert_eq!(*automation.activated.lock().unwrap(), vec![7]);
}

#[tokio::test]
async fn test_window_failure_does_not_prevent_tab_activation() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(3, "https://x.com")],
        fail_window: true,
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("https://x.com", None).await, FocusOutcome::Focused);
    assert_eq!(*automation.activated.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn test_activation_failure_tries_next_match_then_opens() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(1, "https://x.com"), live(2, "https://x.com")],
        broken_tabs: vec![1, 2],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("https://x.com", None).await, FocusOutcome::Opened);
    assert_eq!(automation.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_failure_is_treated_as_no_tabs() {
    let (automation, resolver) = setup(ScriptedAutomation {
        fail_listing: true,
        ..ScriptedAutomation::default()
    });

    assert!(resolver.live_tabs().await.is_empty());
    assert_eq!(resolver.focus_or_open("https://x.com", Some(1)).await, FocusOutcome::Opened);
    assert_eq!(automation.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_only_when_open_also_fails() {
    let (_automation, resolver) = setup(ScriptedAutomation {
        fail_open: true,
        ..ScriptedAutomation::default()
    });
    assert_eq!(resolver.focus_or_open("https://x.com", None).await, FocusOutcome::Failed);
}

#[tokio::test]
async fn test_nothing_to_open_is_failed() {
    let (automation, resolver) = setup(ScriptedAutomation::default());
    assert_eq!(resolver.focus_or_open("", Some(3)).await, FocusOutcome::Failed);
    assert!(automation.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_open_only_backend_cannot_activate() {
    let resolver = TabResolver::new(Arc::new(OpenOnlyAutomation));
    assert!(resolver.live_tabs().await.is_empty());
    let err = resolver.activate(&live(1, "https://x.com")).await.unwrap_err();
    assert!(matches!(err, FocusError::Unsupported(_)));
}

#[tokio::test]
async fn test_browser_hint_does_not_match_positional_id() {
    let (automation, resolver) = setup(ScriptedAutomation {
        tabs: vec![live(-10_002, "https://arc.net")],
        ..ScriptedAutomation::default()
    });

    assert_eq!(resolver.focus_or_open("", Some(10_002)).await, FocusOutcome::Failed);
    assert!(automation.activated.lock().unwrap().is_empty());
}
