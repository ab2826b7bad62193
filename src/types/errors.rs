use thiserror::Error;

// === RecencyError ===

/// Errors raised by recency list operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecencyError {
    /// The candidate record is malformed, e.g. has an empty URL.
    #[error("Invalid tab record: {0}")]
    InvalidRecord(String),
}

// === PersistenceError ===

/// Errors crossing the persistence bridge (history file or local server).
///
/// Always non-fatal: callers degrade to in-memory operation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file or server could not be reached, read or written.
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),
    /// The persisted data exists but could not be decoded.
    #[error("Failed to decode persisted data: {0}")]
    DecodeFailed(String),
}

// === FocusError ===

/// Errors from window/tab activation or tab enumeration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FocusError {
    /// The automation call was rejected or the tab no longer exists.
    #[error("Focus failed: {0}")]
    FocusFailed(String),
    /// The automation backend has no such capability.
    #[error("Unsupported by {0} automation")]
    Unsupported(&'static str),
}

// === HistoryError ===

/// Errors related to the launcher history cache.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Imported data is not a valid history export.
    #[error("History import failed: {0}")]
    Import(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

// === SettingsError ===

/// Errors related to settings loading and saving.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File system I/O error.
    #[error("Settings I/O error: {0}")]
    Io(String),
    /// JSON (de)serialization error.
    #[error("Settings serialization error: {0}")]
    Serialization(String),
    /// An environment override carries an unusable value.
    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: String, value: String },
}
