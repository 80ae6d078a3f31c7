//! Application settings storage
//!
//! Stores output preferences in a JSON file in the app data directory.

use crate::error::ReportError;
use crate::workflow::{DEFAULT_COPY_STATUS, DEFAULT_FILENAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Keys accepted by `config get` / `config set`
pub const KEYS: [&str; 3] = ["output-dir", "download-filename", "copy-status-ms"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory downloads are written to (None = current directory)
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_filename")]
    pub download_filename: String,
    /// How long the copy result label stays before reverting
    #[serde(default = "default_copy_status_ms")]
    pub copy_status_ms: u64,
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_copy_status_ms() -> u64 {
    DEFAULT_COPY_STATUS.as_millis() as u64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: None,
            download_filename: default_filename(),
            copy_status_ms: default_copy_status_ms(),
        }
    }
}

impl Settings {
    /// Load settings from disk or create default
    pub(crate) fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Settings::default()
                }),
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk
    pub(crate) fn save(&self, path: &Path) -> Result<(), ReportError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReportError::Settings(format!("Failed to serialize settings: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ReportError::Settings(format!("Failed to create config directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| ReportError::Settings(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Read a value by its CLI key
    pub fn get(&self, key: &str) -> Result<String, ReportError> {
        match key {
            "output-dir" => Ok(self.output_dir.clone().unwrap_or_else(|| "not set".to_string())),
            "download-filename" => Ok(self.download_filename.clone()),
            "copy-status-ms" => Ok(self.copy_status_ms.to_string()),
            _ => Err(ReportError::Settings(format!("Unknown config key: {}", key))),
        }
    }

    /// Update a value by its CLI key; an empty value resets it
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ReportError> {
        match key {
            "output-dir" => {
                self.output_dir = if value.is_empty() { None } else { Some(value.to_string()) };
            }
            "download-filename" => {
                if value.is_empty() {
                    self.download_filename = default_filename();
                } else if Path::new(value).file_name().and_then(|n| n.to_str()) != Some(value) {
                    return Err(ReportError::Settings(format!(
                        "download-filename must be a plain file name, got '{}'",
                        value
                    )));
                } else {
                    self.download_filename = value.to_string();
                }
            }
            "copy-status-ms" => {
                self.copy_status_ms = if value.is_empty() {
                    default_copy_status_ms()
                } else {
                    value.parse().map_err(|_| {
                        ReportError::Settings(format!("copy-status-ms must be milliseconds, got '{}'", value))
                    })?
                };
            }
            _ => return Err(ReportError::Settings(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }
}

/// Initialize settings with the app data directory
pub fn init(app_data_dir: PathBuf) {
    let config_path = app_data_dir.join("settings.json");
    let settings = Settings::load(&config_path);
    tracing::debug!("Settings loaded from {}", config_path.display());

    if let Ok(mut guard) = CONFIG_PATH.write() {
        *guard = Some(config_path);
    }
    if let Ok(mut guard) = SETTINGS.write() {
        *guard = Some(settings);
    }
}

/// Default app data directory
pub fn default_app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("com.reportgen.app"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Snapshot of the current settings
pub fn current() -> Settings {
    SETTINGS
        .read()
        .ok()
        .and_then(|guard| guard.clone())
        .unwrap_or_default()
}

/// Directory downloads go to (env var first, then stored setting, then cwd)
pub fn output_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPORTGEN_OUTPUT_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    current()
        .output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn download_filename() -> String {
    current().download_filename
}

pub fn copy_status_duration() -> Duration {
    Duration::from_millis(current().copy_status_ms)
}

/// Set a value by key and persist it
pub fn set_value(key: &str, value: &str) -> Result<(), ReportError> {
    let mut settings_guard = SETTINGS
        .write()
        .map_err(|_| ReportError::Settings("Failed to acquire settings lock".to_string()))?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    settings.set(key, value)?;

    // Save to disk
    let config_path = CONFIG_PATH
        .read()
        .map_err(|_| ReportError::Settings("Failed to acquire config path lock".to_string()))?
        .clone()
        .ok_or_else(|| ReportError::Settings("Settings not initialized".to_string()))?;

    settings.save(&config_path)?;

    tracing::info!("Saved {} to {}", key, config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, None);
        assert_eq!(settings.download_filename, "report.md");
        assert_eq!(settings.copy_status_ms, 2000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"copy_status_ms": 500}"#).unwrap();

        let settings = Settings::load(&path);
        assert_eq!(settings.copy_status_ms, 500);
        assert_eq!(settings.download_filename, "report.md");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.set("output-dir", "/tmp/reports").unwrap();
        settings.set("download-filename", "draft.md").unwrap();
        settings.set("copy-status-ms", "1500").unwrap();
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.get("output-dir").unwrap(), "/tmp/reports");
        assert_eq!(loaded.get("copy-status-ms").unwrap(), "1500");
    }

    #[test]
    fn test_empty_value_resets() {
        let mut settings = Settings::default();
        settings.set("output-dir", "out").unwrap();
        settings.set("output-dir", "").unwrap();
        settings.set("copy-status-ms", "10").unwrap();
        settings.set("copy-status-ms", "").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(settings.set("copy-status-ms", "soon").is_err());
        assert!(settings.set("download-filename", "../report.md").is_err());
        assert!(settings.set("colour", "blue").is_err());
        assert!(settings.get("colour").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_every_key_is_readable() {
        let settings = Settings::default();
        for key in KEYS {
            assert!(settings.get(key).is_ok(), "key {}", key);
        }
    }
}
