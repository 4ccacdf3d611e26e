use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::profiles::ProfileTable;
use crate::store::BoardStore;

/// Settings read once at start-up; command-line flags take precedence
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Board snapshot; defaults to the platform data directory
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// JSON array of activity type profiles replacing the built-in table
    #[serde(default)]
    pub profiles_file: Option<PathBuf>,
    /// File name for a daily rolling log next to the snapshot
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Config {
    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dispatchboard", "dispatch-board")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }

    /// Load from the platform config directory; defaults if there is no file
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            Self::get_config_path().ok_or(ConfigError::DirectoryUnavailable("config"))?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let config_data = fs::read_to_string(config_path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", config_path.display(), e)))?;

        let config: Config = serde_json::from_str(&config_data)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", config_path.display(), e)))?;

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let config_data = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        fs::write(config_path, config_data)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        Ok(())
    }

    /// The activity profile table this configuration selects
    pub fn profile_table(&self) -> Result<ProfileTable, ConfigError> {
        match &self.profiles_file {
            Some(path) => ProfileTable::load_from_path(path),
            None => Ok(ProfileTable::builtin()),
        }
    }

    /// The snapshot store this configuration selects
    pub fn board_store(&self) -> Result<BoardStore, ConfigError> {
        match &self.data_file {
            Some(path) => Ok(BoardStore::new(path)),
            None => BoardStore::default_path()
                .map(BoardStore::new)
                .ok_or(ConfigError::DirectoryUnavailable("data")),
        }
    }
}
