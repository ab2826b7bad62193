// TabTrail Settings Engine
// Loads settings from a JSON file at the platform-specific config path, then
// applies environment overrides. Missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::TrailSettings;

pub const ENV_PORT: &str = "TABTRAIL_PORT";
pub const ENV_HISTORY_FILE: &str = "TABTRAIL_HISTORY_FILE";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<TrailSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &TrailSettings;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: TrailSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `<config dir>/settings.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self {
            config_path,
            settings: TrailSettings::default(),
        }
    }

    /// Applies `TABTRAIL_*` overrides read through `lookup`.
    ///
    /// `TABTRAIL_DATA_DIR` is honored earlier, by the platform data dir.
    pub fn apply_overrides<F>(settings: &mut TrailSettings, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.trim().is_empty()) {
            settings.server.port =
                port.trim()
                    .parse()
                    .map_err(|_| SettingsError::InvalidOverride {
                        key: ENV_PORT.to_string(),
                        value: port.clone(),
                    })?;
        }
        if let Some(file) = lookup(ENV_HISTORY_FILE).filter(|v| !v.trim().is_empty()) {
            settings.storage.history_file = PathBuf::from(file);
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from disk and applies environment overrides.
    ///
    /// A missing file yields defaults; a malformed file is an error.
    fn load(&mut self) -> Result<TrailSettings, SettingsError> {
        let mut settings = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path).map_err(|e| {
                SettingsError::Io(format!("Failed to read config file: {}", e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                SettingsError::Serialization(format!("Failed to parse config file: {}", e))
            })?
        } else {
            debug!(path = %self.config_path.display(), "No settings file, using defaults");
            TrailSettings::default()
        };

        Self::apply_overrides(&mut settings, |key| std::env::var(key).ok())?;
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::Io(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    fn get_settings(&self) -> &TrailSettings {
        &self.settings
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
