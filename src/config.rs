use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Result, StorageError};
use crate::models::Config;

/// Directory under the platform config dir holding `config.json`.
const CONFIG_DIR_NAME: &str = "inkdrop";
const CONFIG_FILE_NAME: &str = "config.json";

/// Platform location of the configuration file.
///
/// On Linux: ~/.config/inkdrop/config.json
/// On macOS: ~/Library/Application Support/inkdrop/config.json
/// On Windows: C:\Users\{user}\AppData\Roaming\inkdrop\config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// ConfigManager loads and persists application configuration.
///
/// Saved values are merged over the defaults, so a config file written by an
/// older version (or edited by hand) only needs the fields it changes.
pub struct ConfigManager {
    config: RwLock<Config>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Loads the configuration at `config_path`, falling back to defaults
    /// when the file does not exist.
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let config = Self::load_from_file(&config_path)?;
        Ok(Self {
            config: RwLock::new(config),
            config_path,
        })
    }

    /// Like [`ConfigManager::new`], but writes the defaults out on first run
    /// so users have a file to edit.
    pub fn load_or_init(config_path: PathBuf) -> Result<Self> {
        let first_run = !config_path.exists();
        let manager = Self::new(config_path)?;
        if first_run {
            manager.save_sync()?;
            log::info!("Wrote default config to {}", manager.config_path.display());
        }
        Ok(manager)
    }

    fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| StorageError::io("read config file", path, e))?;
        merge_config_with_defaults(&content)
    }

    /// Gets a clone of the current configuration.
    pub fn get(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Updates the configuration in memory using a closure.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut config);
    }

    /// Saves the configuration to disk immediately.
    pub fn save_sync(&self) -> Result<()> {
        let config = self.get();
        let content = serde_json::to_string_pretty(&config)?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("create config folder", parent, e))?;
        }
        fs::write(&self.config_path, content)
            .map_err(|e| StorageError::io("write config file", &self.config_path, e))
    }

    /// Returns the config file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Merges a partial config JSON with defaults.
///
/// Fields that are missing or of the wrong type keep their default value.
pub fn merge_config_with_defaults(partial_json: &str) -> Result<Config> {
    if partial_json.trim().is_empty() {
        return Ok(Config::default());
    }

    let json_value: serde_json::Value = serde_json::from_str(partial_json)?;
    let mut config = Config::default();

    if let Some(obj) = json_value.as_object() {
        if let Some(v) = obj.get("storage_dir") {
            config.storage_dir = v.as_str().map(|s| s.to_string());
        }
        if let Some(v) = obj.get("folder_name").and_then(|v| v.as_str()) {
            if !v.trim().is_empty() {
                config.folder_name = v.to_string();
            }
        }
        if let Some(v) = obj.get("create_welcome_note").and_then(|v| v.as_bool()) {
            config.create_welcome_note = v;
        }
        if let Some(v) = obj.get("recover_on_startup").and_then(|v| v.as_bool()) {
            config.recover_on_startup = v;
        }
        if let Some(v) = obj.get("log_level").and_then(|v| v.as_str()) {
            config.log_level = v.to_string();
        }
    }

    Ok(config)
}
