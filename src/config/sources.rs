use crate::config::settings::{AppConfig, ConfigValidationError};
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Validation error: {0}")]
    Validation(#[from] ConfigValidationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Values that take priority over every configuration source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Extra configuration file, loaded after the `config/` directory
    pub config_file: Option<PathBuf>,
    pub api_url: Option<String>,
    /// Switches storage to the file backend at this path
    pub state_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Explicit overrides (highest priority)
    /// 2. Environment variables with the `APP__` prefix
    /// 3. Configuration files
    /// 4. Default values (lowest priority)
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_with(&ConfigOverrides::default())
    }

    /// Load configuration, applying `overrides` last
    pub fn load_with(overrides: &ConfigOverrides) -> Result<Self, ConfigLoadError> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            .add_source(File::from_str(&Self::default_config_template(), FileFormat::Yaml));

        for name in ["default".to_string(), environment.clone(), "local".to_string()] {
            if let Some(path) = Self::find_config_file(&name) {
                builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(false));
            }
        }

        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &overrides.api_url {
            builder = builder.set_override("api.base_url", url.as_str())?;
        }
        if let Some(path) = &overrides.state_file {
            builder = builder
                .set_override("storage.backend", "file")?
                .set_override("storage.path", path.to_string_lossy().to_string())?;
        }
        if let Some(level) = &overrides.log_level {
            builder = builder.set_override("logging.level", level.as_str())?;
        }

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.environment = environment;

        app_config.validate()?;

        Ok(app_config)
    }

    fn find_config_file(name: &str) -> Option<PathBuf> {
        ["yaml", "yml"]
            .iter()
            .map(|ext| PathBuf::from(format!("config/{}.{}", name, ext)))
            .find(|path| path.exists())
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Generate a configuration template with all available options and documentation
    pub fn generate_template() -> String {
        Self::default_config_template()
    }

    /// Write a configuration template to a file
    pub fn write_template<P: AsRef<Path>>(path: P) -> Result<(), ConfigLoadError> {
        std::fs::write(path, Self::generate_template())?;
        Ok(())
    }

    fn default_config_template() -> String {
        r#"# Accident Notification client configuration
# Copy this file to config/default.yaml and adjust for your environment.

# Application environment (development, production, test)
environment: "development"

# Backend API
api:
  # Base URL of the Accident Notification backend
  base_url: "http://localhost:8000"
  # Request timeout in seconds (omit to keep the HTTP client default)
  # timeout_seconds: 30
  # User-Agent header sent with every request
  # user_agent: "accident-notify/0.1.0"

# Session storage
storage:
  # memory: state lives for the process only
  # file: state is kept in a JSON file between invocations
  backend: "memory"
  # path: "/home/user/.accident-notify/session.json"

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"
  # Log format: json, pretty, compact
  format: "compact"
  # Include source code location in logs
  include_location: false
  # Log target: stdout, stderr, file
  target: "stderr"
  # File path (required if target is "file")
  # file_path: "/var/log/accident-notify.log"

# Sentry error monitoring configuration
sentry:
  # Sentry DSN (leave empty to disable Sentry)
  dsn: ""
  # Environment name for Sentry
  environment: "development"
  # Sample rate for performance tracing (0.0 to 1.0)
  traces_sample_rate: 0.1
  # Maximum number of breadcrumbs to keep
  max_breadcrumbs: 100
  # Enable debug mode for Sentry SDK
  debug: false

# Landing page map widget
map:
  default_latitude: 0.0
  default_longitude: 0.0
  default_zoom: 13
"#
        .to_string()
    }

    /// Get configuration as a pretty-printed YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Get configuration as a pretty-printed JSON string
    pub fn to_json(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Configuration summary without sensitive values
    pub fn summary(&self) -> String {
        format!(
            "Environment: {}\nAPI: {}\nStorage: {:?}{}\nLog Level: {}\nSentry: {}",
            self.environment,
            self.api.base_url,
            self.storage.backend,
            self.storage
                .path
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default(),
            self.logging.level,
            if self.sentry.is_enabled() { "enabled" } else { "disabled" },
        )
    }
}
