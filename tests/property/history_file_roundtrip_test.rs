//! Property-based tests for the history file.
//!
//! Saving a list and loading it back with no writer in between returns the
//! same list, for arbitrary records.

use proptest::prelude::*;
use tabtrail::services::history_store::HistoryStore;
use tabtrail::types::tab::TabRecord;
use tempfile::TempDir;

/// Strategy for records with non-empty URLs and optional fields.
fn arb_record() -> impl Strategy<Value = TabRecord> {
    (
        proptest::option::of(0i64..100_000),
        "[a-zA-Z0-9 \\-]{1,30}",
        "https://[a-z]{3,10}\\.(com|org|io)(/[a-z0-9]{0,8})?",
        0i64..2_000_000_000_000,
        proptest::option::of("https://[a-z]{3,8}\\.com/favicon\\.ico"),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(id, title, url, last_accessed, icon, pinned)| {
            let mut record = TabRecord::new(&url, &title).with_last_accessed(last_accessed);
            record.id = id;
            record.fav_icon_url = icon;
            record.pinned = pinned;
            record
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn save_then_load_returns_saved_list(tabs in prop::collection::vec(arb_record(), 0..25)) {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store.save(&tabs).unwrap();
        prop_assert_eq!(store.load(), tabs);
    }
}
