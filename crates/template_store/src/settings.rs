//! Persistent package settings: export and import defaults

use crate::templates::{ExportOptions, ImportOptions};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "package_settings.json";

/// Default options for packaging operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageSettings {
    pub export: ExportOptions,
    pub import: ImportOptions,
}

/// Loads and saves `PackageSettings` as JSON
#[derive(Debug)]
pub struct PackageSettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: PackageSettings,
}

impl PackageSettingsManager {
    /// Create a manager storing its file in `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: data_dir.as_ref().join(SETTINGS_FILE),
            current: PackageSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load_sync(&mut self) -> Result<&PackageSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<PackageSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse package settings, using defaults: {}", e);
                    self.current = PackageSettings::default();
                }
            }
        } else {
            self.current = PackageSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    pub fn get(&self) -> &PackageSettings {
        &self.current
    }

    /// Replace and persist settings
    pub fn update(&mut self, settings: PackageSettings) -> Result<()> {
        self.current = settings;
        self.save_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SanitizationLevel, ValidatorConfig, MAX_ARCHIVE_SIZE};

    #[test]
    fn test_defaults() {
        let settings = PackageSettings::default();
        assert!(settings.export.include_assets);
        assert_eq!(settings.export.max_archive_size, MAX_ARCHIVE_SIZE);
        assert_eq!(settings.import.sanitization, SanitizationLevel::Moderate);
        assert!(!settings.import.validator.allow_custom_js);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let json = r#"{"import": {"sanitization": "STRICT"}}"#;
        let settings: PackageSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.import.sanitization, SanitizationLevel::Strict);
        assert!(settings.import.include_assets);
        assert!(settings.export.include_screenshots);
    }

    #[test]
    fn test_load_save_sync() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = PackageSettingsManager::new(dir.path());
        assert_eq!(manager.load_sync().unwrap(), &PackageSettings::default());

        let mut settings = PackageSettings::default();
        settings.import = settings
            .import
            .with_validator(ValidatorConfig::default().with_allowed_domain("cdn.example.com"));
        settings.export = settings.export.with_license("MIT");
        manager.update(settings.clone()).unwrap();

        let mut reloaded = PackageSettingsManager::new(dir.path());
        assert_eq!(reloaded.load_sync().unwrap(), &settings);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{oops").unwrap();
        let mut manager = PackageSettingsManager::new(dir.path());
        assert_eq!(manager.load_sync().unwrap(), &PackageSettings::default());
    }
}
