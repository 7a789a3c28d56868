//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the configured API base URL.
pub const BASE_URL_ENV: &str = "DEPARTMENT_API_BASE_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// REST backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout in seconds; requests run to completion when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// UI preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Re-fetch the selected department after adding or removing an employee.
    #[serde(default)]
    pub resync_after_write: bool,
    /// Ask before removing an employee.
    #[serde(default = "default_true")]
    pub confirm_removals: bool,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Get config file path in the platform config directory.
    ///
    /// Falls back to the directory of the executable when no home directory
    /// can be resolved.
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = project_dirs() {
            return dirs.config_dir().join("config.toml");
        }
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url(&self.api.base_url)?;
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the base URL with an override when one is given.
    ///
    /// Blank overrides are ignored.
    pub fn apply_base_url_override(&mut self, value: Option<&str>) {
        if let Some(url) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.api.base_url = url.to_string();
        }
    }

    /// Apply the `DEPARTMENT_API_BASE_URL` environment override.
    pub fn apply_env_overrides(&mut self) {
        let value = std::env::var(BASE_URL_ENV).ok();
        self.apply_base_url_override(value.as_deref());
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

/// Check that a base URL is usable for the HTTP client.
pub fn validate_base_url(url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::Validation("API base URL cannot be empty".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "API base URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(())
}

/// Platform directories for config and log files.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "example", "department-console")
}

/// Directory for rolling log files.
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            resync_after_write: false,
            confirm_removals: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert!(config.ui.confirm_removals);
        assert!(!config.ui.resync_after_write);
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let mut config = AppConfig::default();

        config.api.base_url = String::new();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://invalid".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://hr.example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = Some(0);
        assert!(config.validate().is_err());

        config.api.timeout_secs = Some(10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_override() {
        let mut config = AppConfig::default();

        config.apply_base_url_override(None);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

        config.apply_base_url_override(Some("   "));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

        config.apply_base_url_override(Some(" http://api.internal:9000 "));
        assert_eq!(config.api.base_url, "http://api.internal:9000");
    }

    #[test]
    fn test_normalized_base_url_strips_trailing_slash() {
        let api = ApiConfig {
            base_url: "http://localhost:8080/".to_string(),
            timeout_secs: None,
        };
        assert_eq!(api.normalized_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = toml::from_str("[api]\nbase_url = \"http://example.org\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://example.org");
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.api.base_url = "http://10.0.0.5:8080".to_string();
        config.ui.resync_after_write = true;
        config.save(&path).unwrap();

        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(loaded) => assert_eq!(loaded, config),
            other => panic!("unexpected load result: {other:?}"),
        }
    }

    #[test]
    fn test_try_load_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(matches!(AppConfig::try_load(&path), ConfigLoadResult::Missing));

        std::fs::write(&path, "[api]\nbase_url = \"localhost\"\n").unwrap();
        assert!(matches!(
            AppConfig::try_load(&path),
            ConfigLoadResult::Invalid(ConfigError::Validation(_))
        ));

        std::fs::write(&path, "not toml at all [").unwrap();
        assert!(matches!(
            AppConfig::try_load(&path),
            ConfigLoadResult::Invalid(ConfigError::Parse(_))
        ));
    }
}
