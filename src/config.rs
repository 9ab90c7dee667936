use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{ReminderError, Result, DEFAULT_GROUP_NAME};

/// Slot name the group list is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "SavedReminderGroups";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted slots
    pub data_dir: PathBuf,

    /// Name of the slot the group list is written to
    pub storage_key: String,

    /// Name of the group created when none exist
    pub default_group_name: String,

    /// How often the notification center checks for due notifications (in seconds)
    pub poll_interval_secs: u64,

    /// Whether notifications ask for the critical alert sound
    pub critical_sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".repeat-reminder"));

        Self {
            data_dir,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_group_name: DEFAULT_GROUP_NAME.to_string(),
            poll_interval_secs: 15,
            critical_sound: true,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "repeat-reminder")
}

impl Config {
    /// Platform location of the config file, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads and validates a JSON config file
    pub fn load(path: &Path) -> Result<Config> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    // Missing files are normal on first run, broken ones are worth a warning
    pub fn load_or_default(path: Option<&Path>) -> Config {
        let Some(path) = path.map(Path::to_path_buf).or_else(Config::default_path) else {
            info!("No config location available, using defaults");
            return Config::default();
        };

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Config::default();
        }

        match Config::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(ReminderError::ConfigError {
                message: "storage_key must not be empty".to_string(),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ReminderError::ConfigError {
                message: "poll_interval_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
