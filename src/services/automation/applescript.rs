//! OS-level tab automation through AppleScript (`osascript`).
//!
//! Works with the Chromium-family browsers that expose the Chrome scripting
//! dictionary. Arc selects a tab with `select`; the others set the window's
//! `active tab index`.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::TabAutomation;
use crate::platform;
use crate::types::errors::FocusError;
use crate::types::settings::BrowserFlavor;
use crate::types::tab::LiveTab;

const OSASCRIPT: &str = "osascript";

/// Field separator in the tab listing (ASCII tab).
const FIELD_SEP: char = '\t';

/// AppleScript driver for one browser.
#[derive(Debug, Clone)]
pub struct AppleScriptAutomation {
    flavor: BrowserFlavor,
}

impl AppleScriptAutomation {
    pub fn new(flavor: BrowserFlavor) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> BrowserFlavor {
        self.flavor
    }

    fn app(&self) -> String {
        escape_applescript(self.flavor.app_name())
    }

    /// Script printing one line per tab:
    /// `window index, window id, tab index, tab id, active, url, title`.
    pub fn list_tabs_script(&self) -> String {
        let active_test = match self.flavor {
            BrowserFlavor::Arc => "((id of t) is (id of active tab of w))",
            _ => "(ti is (active tab index of w))",
        };
        format!(
            r#"set sep to ASCII character 9
set output to ""
tell application "{app}"
    set wi to 0
    repeat with w in windows
        set wi to wi + 1
        set ti to 0
        repeat with t in tabs of w
            set ti to ti + 1
            set isActive to (wi is 1) and {active_test}
            set output to output & wi & sep & (id of w) & sep & ti & sep & (id of t) & sep & isActive & sep & (URL of t) & sep & (title of t) & linefeed
        end repeat
    end repeat
end tell
return output"#,
            app = self.app(),
            active_test = active_test,
        )
    }

    pub fn activate_window_script(&self, tab: &LiveTab) -> Result<String, FocusError> {
        Ok(format!(
            r#"tell application "{app}"
    activate
    set index of {window} to 1
end tell"#,
            app = self.app(),
            window = window_ref(tab)?,
        ))
    }

    pub fn activate_tab_script(&self, tab: &LiveTab) -> Result<String, FocusError> {
        let tab_index = tab
            .tab_index
            .ok_or_else(|| FocusError::FocusFailed(format!("tab {} has no tab index", tab.id)))?;
        let body = match self.flavor {
            BrowserFlavor::Arc => format!("tell tab {} of {} to select", tab_index, window_ref(tab)?),
            _ => format!("set active tab index of {} to {}", window_ref(tab)?, tab_index),
        };
        Ok(format!(
            r#"tell application "{app}"
    {body}
end tell"#,
            app = self.app(),
            body = body,
        ))
    }

    pub fn open_url_script(&self, url: &str) -> String {
        format!(
            r#"tell application "{app}"
    activate
    open location "{url}"
end tell"#,
            app = self.app(),
            url = escape_applescript(url),
        )
    }
}

#[async_trait]
impl TabAutomation for AppleScriptAutomation {
    fn name(&self) -> &'static str {
        "applescript"
    }

    async fn is_available(&self) -> bool {
        platform::command_available(OSASCRIPT) && platform::application_installed(self.flavor.app_name())
    }

    async fn list_tabs(&self) -> Result<Vec<LiveTab>, FocusError> {
        let output = run_applescript(&self.list_tabs_script()).await?;
        Ok(parse_tab_listing(&output))
    }

    async fn activate_window(&self, tab: &LiveTab) -> Result<(), FocusError> {
        run_applescript(&self.activate_window_script(tab)?).await.map(|_| ())
    }

    async fn activate_tab(&self, tab: &LiveTab) -> Result<(), FocusError> {
        run_applescript(&self.activate_tab_script(tab)?).await.map(|_| ())
    }

    async fn open_url(&self, url: &str) -> Result<(), FocusError> {
        run_applescript(&self.open_url_script(url)).await.map(|_| ())
    }
}

/// Runs an AppleScript and returns its trimmed stdout.
async fn run_applescript(script: &str) -> Result<String, FocusError> {
    debug!(script_len = script.len(), "Running AppleScript");
    let output = Command::new(OSASCRIPT)
        .arg("-e")
        .arg(script)
        .output()
        .await
        .map_err(|e| FocusError::FocusFailed(format!("Failed to run osascript: {}", e)))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(FocusError::FocusFailed(format!("AppleScript error: {}", stderr)))
    }
}

/// Escapes a value for embedding inside an AppleScript string literal.
pub fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `window id N` when the id is numeric, `window id "X"` otherwise, and
/// `window N` by index when no id is known.
fn window_ref(tab: &LiveTab) -> Result<String, FocusError> {
    match (&tab.window_id, tab.window_index) {
        (Some(id), _) if id.parse::<i64>().is_ok() => Ok(format!("window id {}", id)),
        (Some(id), _) => Ok(format!("window id \"{}\"", escape_applescript(id))),
        (None, Some(index)) => Ok(format!("window {}", index)),
        (None, None) => Err(FocusError::FocusFailed(format!("tab {} has no window", tab.id))),
    }
}

fn positional_id(window_index: u32, tab_index: u32) -> i64 {
    -(i64::from(window_index) * 10_000 + i64::from(tab_index))
}

/// Parses the output of `list_tabs_script`. Malformed lines are skipped.
///
/// Tab ids that are not numeric (Arc) are replaced by a positional id,
/// `-(window_index * 10000 + tab_index)`. Browser tab ids are never
/// negative, so a hint from the extension cannot match a positional id.
pub fn parse_tab_listing(output: &str) -> Vec<LiveTab> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.splitn(7, FIELD_SEP).collect();
            if fields.len() < 7 {
                return None;
            }
            let window_index: u32 = fields[0].trim().parse().ok()?;
            let tab_index: u32 = fields[2].trim().parse().ok()?;
            let url = fields[5].trim();
            if url.is_empty() {
                return None;
            }
            let id = fields[3]
                .trim()
                .parse::<i64>()
                .unwrap_or_else(|_| positional_id(window_index, tab_index));
            let window_id = Some(fields[1].trim().to_string()).filter(|w| !w.is_empty());
            Some(LiveTab {
                id,
                window_id,
                title: fields[6].trim().to_string(),
                url: url.to_string(),
                favicon: None,
                active: fields[4].trim().eq_ignore_ascii_case("true"),
                window_index: Some(window_index),
                tab_index: Some(tab_index),
            })
        })
        .collect()
}
