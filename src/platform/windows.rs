// TabTrail platform paths for Windows
// Config: %APPDATA%/TabTrail
// Data:   %APPDATA%/TabTrail

use std::env;
use std::path::PathBuf;

/// Returns `%USERPROFILE%`.
pub fn home_dir() -> PathBuf {
    PathBuf::from(env::var("USERPROFILE").unwrap_or_else(|_| String::from("C:\\Users\\Default")))
}

/// `%APPDATA%/TabTrail`
pub fn get_config_dir() -> PathBuf {
    let appdata =
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("TabTrail")
}

/// `%APPDATA%/TabTrail`
pub fn get_data_dir() -> PathBuf {
    get_config_dir()
}
