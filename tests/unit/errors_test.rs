use tabtrail::types::errors::*;

// === RecencyError Tests ===

#[test]
fn recency_error_invalid_record_display() {
    let err = RecencyError::InvalidRecord("url must not be empty".to_string());
    assert_eq!(err.to_string(), "Invalid tab record: url must not be empty");
}

#[test]
fn recency_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(RecencyError::InvalidRecord("x".to_string()));
    assert!(err.source().is_none());
}

// === PersistenceError Tests ===

#[test]
fn persistence_error_display_variants() {
    assert_eq!(
        PersistenceError::Unavailable("connection refused".to_string()).to_string(),
        "Persistence unavailable: connection refused"
    );
    assert_eq!(
        PersistenceError::DecodeFailed("expected value at line 1".to_string()).to_string(),
        "Failed to decode persisted data: expected value at line 1"
    );
}

// === FocusError Tests ===

#[test]
fn focus_error_display_variants() {
    assert_eq!(
        FocusError::FocusFailed("tab 7 is gone".to_string()).to_string(),
        "Focus failed: tab 7 is gone"
    );
    assert_eq!(
        FocusError::Unsupported("open-only").to_string(),
        "Unsupported by open-only automation"
    );
}

// === HistoryError Tests ===

#[test]
fn history_error_import_display() {
    let err = HistoryError::Import("not an array".to_string());
    assert_eq!(err.to_string(), "History import failed: not an array");
}

#[test]
fn history_error_wraps_persistence_transparently() {
    let err: HistoryError = PersistenceError::Unavailable("disk full".to_string()).into();
    assert!(matches!(err, HistoryError::Persistence(_)));
    assert_eq!(err.to_string(), "Persistence unavailable: disk full");
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::Io("permission denied".to_string()).to_string(),
        "Settings I/O error: permission denied"
    );
    assert_eq!(
        SettingsError::Serialization("trailing comma".to_string()).to_string(),
        "Settings serialization error: trailing comma"
    );
    assert_eq!(
        SettingsError::InvalidOverride {
            key: "TABTRAIL_PORT".to_string(),
            value: "abc".to_string()
        }
        .to_string(),
        "Invalid value for TABTRAIL_PORT: abc"
    );
}
