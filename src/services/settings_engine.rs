// markshelf Settings Engine
// Loads, saves, updates and resets `LibrarySettings`.
// Settings are stored as a JSON file at the platform-specific config path.

use std::env;
use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::LibrarySettings;

/// Overrides the settings file location.
pub const CONFIG_PATH_ENV: &str = "MARKSHELF_CONFIG";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<LibrarySettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &LibrarySettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: LibrarySettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses `settings.json` in the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: LibrarySettings::default(),
        }
    }

    /// Like [`SettingsEngine::new`], taking the override from `MARKSHELF_CONFIG`.
    pub fn from_env() -> Self {
        Self::new(env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty()))
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    /// Keys absent from the file keep their default values.
    fn load(&mut self) -> Result<LibrarySettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = LibrarySettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("Failed to read config file: {}", e)))?;

        let settings: LibrarySettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::Serialization(format!("Failed to parse config file: {}", e))
        })?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::Io(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Updates one setting by dot-notation key path and saves.
    ///
    /// The settings are round-tripped through `serde_json::Value`, so a value
    /// of the wrong shape is rejected without touching the current settings.
    ///
    /// # Examples
    /// - `"storage"` → `"Remote"`
    /// - `"remote.timeout_secs"` → `30`
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::Serialization(format!("Failed to serialize settings: {}", e))
        })?;

        {
            let (last, path) = parts
                .split_last()
                .ok_or_else(|| SettingsError::InvalidKey("Key cannot be empty".to_string()))?;

            let mut current = &mut json_value;
            for part in path {
                current = current.get_mut(*part).ok_or_else(|| {
                    SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
                })?;
            }

            match current {
                serde_json::Value::Object(map) if map.contains_key(*last) => {
                    map.insert(last.to_string(), value);
                }
                serde_json::Value::Object(_) => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Key '{}' not found in settings",
                        key
                    )));
                }
                _ => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Cannot navigate to key '{}': intermediate value is not an object",
                        key
                    )));
                }
            }
        }

        let new_settings: LibrarySettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save()?;

        Ok(())
    }

    /// Resets all settings to defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = LibrarySettings::default();
        self.save()?;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
