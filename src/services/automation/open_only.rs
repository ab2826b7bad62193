//! Fallback automation with no tab access: every focus becomes an open.

use async_trait::async_trait;

use super::{system_open, TabAutomation};
use crate::types::errors::FocusError;
use crate::types::tab::LiveTab;

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOnlyAutomation;

#[async_trait]
impl TabAutomation for OpenOnlyAutomation {
    fn name(&self) -> &'static str {
        "open-only"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn list_tabs(&self) -> Result<Vec<LiveTab>, FocusError> {
        Ok(Vec::new())
    }

    async fn activate_window(&self, _tab: &LiveTab) -> Result<(), FocusError> {
        Err(FocusError::Unsupported(self.name()))
    }

    async fn activate_tab(&self, _tab: &LiveTab) -> Result<(), FocusError> {
        Err(FocusError::Unsupported(self.name()))
    }

    async fn open_url(&self, url: &str) -> Result<(), FocusError> {
        system_open(url).await
    }
}
