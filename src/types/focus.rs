use serde::{Deserialize, Serialize};

/// A pending cross-process request to focus a browser tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusRequest {
    /// `None` is the "nothing pending" poll response.
    pub tab_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

impl FocusRequest {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_tab(tab_id: i64) -> Self {
        Self {
            tab_id: Some(tab_id),
            request_id: None,
        }
    }
}

/// Result of a focus-or-open attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusOutcome {
    Focused,
    Opened,
    Failed,
}

impl FocusOutcome {
    pub fn is_success(self) -> bool {
        !matches!(self, FocusOutcome::Failed)
    }
}
