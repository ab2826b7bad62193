//! URL filter policy.
//!
//! Decides whether a URL is a navigable web page worth tracking. Browser UI
//! pages and extension-internal pages are rejected before they ever reach a
//! recency list.

use crate::types::settings::PolicySettings;

/// Prefix-based URL filter.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlPolicy {
    blocked_prefixes: Vec<String>,
}

impl UrlPolicy {
    /// Builds a policy from explicit prefixes. Matching is ASCII
    /// case-insensitive; empty prefixes are ignored.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked_prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_ascii_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_settings(settings: &PolicySettings) -> Self {
        Self::new(&settings.blocked_prefixes)
    }

    pub fn blocked_prefixes(&self) -> &[String] {
        &self.blocked_prefixes
    }

    /// Returns true if `url` may be recorded.
    pub fn allows(&self, url: &str) -> bool {
        let url = url.trim_start();
        if url.is_empty() {
            return false;
        }
        !self.blocked_prefixes.iter().any(|prefix| {
            url.len() >= prefix.len()
                && url.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        })
    }

    /// Returns true if an optional URL is present and allowed.
    pub fn allows_opt(&self, url: Option<&str>) -> bool {
        url.map(|u| self.allows(u)).unwrap_or(false)
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::from_settings(&PolicySettings::default())
    }
}
