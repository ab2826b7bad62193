// TabTrail platform abstraction
// Provides platform-specific paths and runtime capability probes.
//
// Paths are selected with `cfg(target_os)` at compile time. Capability probes
// (is `osascript` installed, is a browser bundle present) run at runtime.

use std::env;
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as os;
#[cfg(target_os = "macos")]
use macos as os;
#[cfg(target_os = "windows")]
use windows as os;

/// File name of the shared history file, kept for compatibility with the
/// launcher extension that reads it.
pub const HISTORY_FILE_NAME: &str = ".raycast-last-tabs.json";

/// Returns the current user's home directory.
pub fn home_dir() -> PathBuf {
    os::home_dir()
}

/// Returns the platform-specific configuration directory for TabTrail.
///
/// - **Linux**: `~/.config/tabtrail` (or `$XDG_CONFIG_HOME/tabtrail`)
/// - **macOS**: `~/Library/Application Support/TabTrail`
/// - **Windows**: `%APPDATA%/TabTrail`
pub fn get_config_dir() -> PathBuf {
    os::get_config_dir()
}

/// Returns the platform-specific data directory for TabTrail.
///
/// `TABTRAIL_DATA_DIR` takes precedence when set.
pub fn get_data_dir() -> PathBuf {
    match env::var("TABTRAIL_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => os::get_data_dir(),
    }
}

/// Default location of the shared history file: `~/.raycast-last-tabs.json`.
pub fn default_history_file() -> PathBuf {
    home_dir().join(HISTORY_FILE_NAME)
}

/// Returns true if an executable named `program` is reachable through `PATH`
/// or exists at the given absolute path.
pub fn command_available(program: &str) -> bool {
    let candidate = Path::new(program);
    if candidate.is_absolute() {
        return candidate.is_file();
    }
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

/// Returns true if a macOS application bundle named `app_name` is installed.
pub fn application_installed(app_name: &str) -> bool {
    let bundle = format!("{}.app", app_name);
    [
        PathBuf::from("/Applications"),
        home_dir().join("Applications"),
    ]
    .iter()
    .any(|dir| dir.join(&bundle).exists())
}

/// The command and leading arguments that hand a URL to the default browser.
pub fn system_open_command() -> (&'static str, &'static [&'static str]) {
    #[cfg(target_os = "macos")]
    {
        ("open", &[])
    }
    #[cfg(target_os = "windows")]
    {
        ("cmd", &["/C", "start", ""])
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        ("xdg-open", &[])
    }
}
