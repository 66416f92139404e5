use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid API configuration: {0}")]
    Api(String),
    #[error("Invalid storage configuration: {0}")]
    Storage(String),
    #[error("Invalid logging configuration: {0}")]
    Logging(String),
    #[error("Invalid Sentry configuration: {0}")]
    Sentry(String),
    #[error("Invalid map configuration: {0}")]
    Map(String),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub sentry: SentryConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub environment: String,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.api.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        self.sentry.validate()?;
        self.map.validate()?;
        Ok(())
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout. `None` keeps the transport default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.base_url.is_empty() {
            return Err(ConfigValidationError::Api("Base URL cannot be empty".to_string()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigValidationError::Api(format!("Invalid base URL: {}", e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigValidationError::Api(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::Api("Timeout must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Parsed base URL
    pub fn url(&self) -> Result<Url, ConfigValidationError> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigValidationError::Api(format!("Invalid base URL: {}", e)))
    }
}

fn default_user_agent() -> String {
    format!("accident-notify/{}", env!("CARGO_PKG_VERSION"))
}

/// Where session state lives between screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

/// Credential storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.backend == StorageBackend::File {
            match &self.path {
                None => {
                    return Err(ConfigValidationError::Storage(
                        "Path must be provided when backend is 'file'".to_string(),
                    ))
                }
                Some(path) if path.as_os_str().is_empty() => {
                    return Err(ConfigValidationError::Storage("Path cannot be empty".to_string()))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
    #[serde(default = "default_log_target")]
    pub target: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigValidationError::Logging(format!(
                "Invalid log level '{}'. Valid levels: {}",
                self.level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigValidationError::Logging(format!(
                "Invalid log format '{}'. Valid formats: {}",
                self.format,
                valid_formats.join(", ")
            )));
        }

        let valid_targets = ["stdout", "stderr", "file"];
        if !valid_targets.contains(&self.target.to_lowercase().as_str()) {
            return Err(ConfigValidationError::Logging(format!(
                "Invalid log target '{}'. Valid targets: {}",
                self.target,
                valid_targets.join(", ")
            )));
        }

        if self.target.to_lowercase() == "file" && self.file_path.is_none() {
            return Err(ConfigValidationError::Logging(
                "File path must be provided when target is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

// stdout carries command output, so logs default to stderr
fn default_log_target() -> String {
    "stderr".to_string()
}

/// Sentry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryConfig {
    pub dsn: String,
    pub environment: String,
    pub traces_sample_rate: f32,
    #[serde(default = "default_release")]
    pub release: Option<String>,
    #[serde(default = "default_max_breadcrumbs")]
    pub max_breadcrumbs: usize,
    #[serde(default)]
    pub debug: bool,
}

impl SentryConfig {
    /// Validate Sentry configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // An empty DSN disables Sentry
        if !self.dsn.is_empty() && !self.dsn.starts_with("https://") && !self.dsn.starts_with("http://") {
            return Err(ConfigValidationError::Sentry(
                "DSN must be a valid URL starting with http:// or https://".to_string(),
            ));
        }

        if self.environment.is_empty() {
            return Err(ConfigValidationError::Sentry("Environment cannot be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.traces_sample_rate) {
            return Err(ConfigValidationError::Sentry(
                "Traces sample rate must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.max_breadcrumbs == 0 {
            return Err(ConfigValidationError::Sentry("Max breadcrumbs must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Check if Sentry is enabled (has a DSN)
    pub fn is_enabled(&self) -> bool {
        !self.dsn.is_empty()
    }
}

fn default_release() -> Option<String> {
    Some(env!("CARGO_PKG_VERSION").to_string())
}

fn default_max_breadcrumbs() -> usize {
    100
}

/// Initial view of the landing-page map widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_zoom: u8,
}

impl MapConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(-90.0..=90.0).contains(&self.default_latitude) {
            return Err(ConfigValidationError::Map("Latitude must be between -90 and 90".to_string()));
        }

        if !(-180.0..=180.0).contains(&self.default_longitude) {
            return Err(ConfigValidationError::Map("Longitude must be between -180 and 180".to_string()));
        }

        if self.default_zoom > 20 {
            return Err(ConfigValidationError::Map("Zoom must be between 0 and 20".to_string()));
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            include_location: false,
            target: default_log_target(),
            file_path: None,
        }
    }
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: "".to_string(),
            environment: "development".to_string(),
            traces_sample_rate: 0.1,
            release: default_release(),
            max_breadcrumbs: default_max_breadcrumbs(),
            debug: false,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: 0.0,
            default_longitude: 0.0,
            default_zoom: 13,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            sentry: SentryConfig::default(),
            map: MapConfig::default(),
            environment: "development".to_string(),
        }
    }
}
