// TabTrail platform paths for macOS
// Config: ~/Library/Application Support/TabTrail
// Data:   ~/Library/Application Support/TabTrail

use std::env;
use std::path::PathBuf;

/// Returns the home directory on macOS.
pub fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `~/Library/Application Support/TabTrail`
pub fn get_config_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("TabTrail")
}

/// `~/Library/Application Support/TabTrail`
pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}
