// TabTrail platform paths for Linux
// Config: ~/.config/tabtrail
// Data:   ~/.local/share/tabtrail

use std::env;
use std::path::PathBuf;

/// Returns the home directory on Linux.
pub fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the configuration directory for TabTrail on Linux.
/// Uses `$XDG_CONFIG_HOME/tabtrail` if set, otherwise `~/.config/tabtrail`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("tabtrail"),
        _ => home_dir().join(".config").join("tabtrail"),
    }
}

/// Returns the data directory for TabTrail on Linux.
/// Uses `$XDG_DATA_HOME/tabtrail` if set, otherwise `~/.local/share/tabtrail`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("tabtrail"),
        _ => home_dir().join(".local").join("share").join("tabtrail"),
    }
}
