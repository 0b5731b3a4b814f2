use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::locale::Locale;

/// Environment variable that supplies the API key. It takes precedence over
/// the config file and is never written back to it.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream weather API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP retry settings
    #[serde(default)]
    pub retry: RetrySettings,

    /// Search behavior
    #[serde(default)]
    pub search: SearchConfig,

    /// Persisted state location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Coordinate reported by the fixed location provider, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<DefaultLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the OpenWeather data API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as `appid`; overridden by OPENWEATHER_API_KEY
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Unit system requested from the API
    #[serde(default = "default_units")]
    pub units: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            units: default_units(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step: attempt k waits k * backoff_ms
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a search-as-you-type query fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interface language code
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_locale() -> String {
    Locale::default().code().to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            locale: default_locale(),
        }
    }
}

impl SearchConfig {
    /// Configured locale, falling back to English when unrecognized.
    pub fn locale(&self) -> Locale {
        Locale::parse(&self.locale).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding persisted search history, last location and card order
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nimbus")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            retry: RetrySettings::default(),
            search: SearchConfig::default(),
            storage: StorageConfig::default(),
            default_location: None,
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults if absent.
    ///
    /// The API key from [`API_KEY_ENV`] replaces the one in the file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let contents =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            config
        };

        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Replace the API key with `key` unless it is missing or blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            tracing::debug!("Using API key from {}", API_KEY_ENV);
            self.api.api_key = key;
        }
        self
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.base_url, "api.base_url", &mut result);

        if self.api.api_key.trim().is_empty() {
            result.add_warning(
                "api.api_key",
                "No API key configured - requests will be rejected (set OPENWEATHER_API_KEY)",
            );
        }

        if self.api.timeout_secs == 0 {
            result.add_error("api.timeout_secs", "Timeout must be greater than 0");
        }

        if self.retry.max_attempts == 0 {
            result.add_error("retry.max_attempts", "At least one attempt is required");
        } else if self.retry.max_attempts > 10 {
            result.add_warning("retry.max_attempts", "More than 10 attempts per request");
        }

        if self.search.debounce_ms == 0 {
            result.add_warning("search.debounce_ms", "Debounce disabled (0 ms)");
        }

        if Locale::parse(&self.search.locale).is_none() {
            result.add_error(
                "search.locale",
                format!("Unsupported locale: {}", self.search.locale),
            );
        }

        if let Some(loc) = &self.default_location {
            if !(-90.0..=90.0).contains(&loc.lat) || !(-180.0..=180.0).contains(&loc.lon) {
                result.add_error(
                    "default_location",
                    format!("Coordinate out of range: {}, {}", loc.lat, loc.lon),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let mut on_disk = self.clone();
        let env_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        if !env_key.trim().is_empty() && on_disk.api.api_key == env_key.trim() {
            on_disk.api.api_key.clear();
        }

        let contents = toml::to_string_pretty(&on_disk).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("nimbus");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "{}", result.error_summary());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_ms, 1000);
        assert_eq!(config.search.debounce_ms, 2000);
        assert_eq!(config.api.units, "metric");
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.error_summary().contains("api.base_url"));

        config.api.base_url = "not a url".to_string();
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_unknown_locale_rejected() {
        let mut config = Config::default();
        config.search.locale = "fr".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert_eq!(config.search.locale(), Locale::En);
    }

    #[test]
    fn test_missing_api_key_is_warning() {
        let mut config = Config::default();
        config.api.api_key = String::new();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "api.api_key"));
    }

    #[test]
    fn test_out_of_range_default_location() {
        let mut config = Config::default();
        config.default_location = Some(DefaultLocation {
            lat: 120.0,
            lon: 0.0,
            name: None,
        });
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_api_key_override_ignores_blank() {
        let mut config = Config::default();
        config.api.api_key = "from-file".to_string();

        let config = config.with_api_key_override(Some("   ".to_string()));
        assert_eq!(config.api.api_key, "from-file");
        let config = config.with_api_key_override(None);
        assert_eq!(config.api.api_key, "from-file");
        let config = config.with_api_key_override(Some(" env-key ".to_string()));
        assert_eq!(config.api.api_key, "env-key");
    }

    #[test]
    fn test_env_api_key_applies_after_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::env::remove_var(API_KEY_ENV);
        let first = Config::load_from(&path).unwrap();
        assert_eq!(first.api.api_key, "");
        assert!(!std::fs::read_to_string(&path).unwrap().contains("api_key"));

        std::env::set_var(API_KEY_ENV, "real-key");
        let second = Config::load_from(&path).unwrap();
        assert_eq!(second.api.api_key, "real-key");

        second.save_to(&path).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        std::env::remove_var(API_KEY_ENV);
        assert!(!on_disk.contains("real-key"));
    }

    #[test]
    fn test_load_creates_default_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let mut edited = created.clone();
        edited.search.locale = "ar".to_string();
        edited.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.locale(), Locale::Ar);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndebounce_ms = 500\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.locale, "en");
        assert_eq!(config.retry.max_attempts, 3);
    }
}
