use crate::config::settings::{AppConfig, LoggingConfig, SentryConfig};
use anyhow::Result;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};
use uuid::Uuid;

/// Correlation ID attached to every backend request
#[derive(Debug, Clone)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the correlation ID as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keeps the log writer and the Sentry client alive; flushes both on drop
pub struct TelemetryGuard {
    _writer: Option<WorkerGuard>,
    _sentry: Option<sentry::ClientInitGuard>,
}

/// Initialize the global tracing subscriber and, if configured, Sentry
pub fn init_tracing(config: &AppConfig) -> Result<TelemetryGuard> {
    let logging_config = &config.logging;
    let sentry_guard = init_sentry(&config.sentry)?;

    let env_filter = create_env_filter(logging_config);
    let (writer, writer_guard) = create_writer(logging_config)?;
    let fmt_layer = create_fmt_layer(logging_config, writer);

    let sentry_layer = sentry_guard.is_some().then(create_sentry_layer);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(sentry_layer)
        .try_init()?;

    tracing::debug!(
        "Tracing initialized with level: {}, format: {}, target: {}, sentry_enabled: {}",
        logging_config.level,
        logging_config.format,
        logging_config.target,
        config.sentry.is_enabled()
    );
    if sentry_guard.is_some() {
        tracing::info!(
            "Sentry initialized with DSN: {}, environment: {}",
            mask_dsn(&config.sentry.dsn),
            config.sentry.environment
        );
    }

    Ok(TelemetryGuard {
        _writer: writer_guard,
        _sentry: sentry_guard,
    })
}

/// Initialize Sentry SDK with configuration
fn init_sentry(config: &SentryConfig) -> Result<Option<sentry::ClientInitGuard>> {
    if !config.is_enabled() {
        return Ok(None);
    }

    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(config.dsn.parse()?),
        environment: Some(config.environment.clone().into()),
        release: config.release.clone().map(Into::into),
        traces_sample_rate: config.traces_sample_rate,
        max_breadcrumbs: config.max_breadcrumbs,
        debug: config.debug,
        ..Default::default()
    });

    sentry::configure_scope(|scope| {
        scope.set_tag("service", "accident-notify");
        scope.set_tag("version", env!("CARGO_PKG_VERSION"));
    });

    Ok(Some(guard))
}

/// Mask sensitive parts of DSN for logging
fn mask_dsn(dsn: &str) -> String {
    if let Ok(parsed) = dsn.parse::<url::Url>() {
        format!("{}://***@{}", parsed.scheme(), parsed.host_str().unwrap_or("unknown"))
    } else {
        "***".to_string()
    }
}

fn create_sentry_layer<S>() -> sentry::integrations::tracing::SentryLayer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    sentry::integrations::tracing::layer().event_filter(|md| match *md.level() {
        tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO | tracing::Level::DEBUG => {
            sentry::integrations::tracing::EventFilter::Breadcrumb
        }
        tracing::Level::TRACE => sentry::integrations::tracing::EventFilter::Ignore,
    })
}

/// `RUST_LOG` wins over the configured level; an unparsable level falls back to info
fn create_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn create_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    match config.target.to_lowercase().as_str() {
        "stdout" => Ok((BoxMakeWriter::new(io::stdout), None)),
        "file" => {
            let file_path = config
                .file_path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("File path is required when target is 'file'"))?;

            let path = std::path::Path::new(file_path);
            let directory = path
                .parent()
                .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", file_path))?;
            let filename = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", file_path))?;

            std::fs::create_dir_all(directory)?;

            let file_appender = tracing_appender::rolling::daily(directory, filename);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            Ok((BoxMakeWriter::new(non_blocking), Some(guard)))
        }
        _ => Ok((BoxMakeWriter::new(io::stderr), None)),
    }
}

fn create_fmt_layer(
    config: &LoggingConfig,
    writer: BoxMakeWriter,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(FmtSpan::CLOSE);

    match config.format.to_lowercase().as_str() {
        "json" => layer.json().boxed(),
        "pretty" => layer.pretty().boxed(),
        _ => layer.compact().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str, format: &str, target: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: format.to_string(),
            include_location: false,
            target: target.to_string(),
            file_path: None,
        }
    }

    #[test]
    fn test_correlation_id_generation() {
        let id1 = CorrelationId::new();
        let id2 = CorrelationId::new();

        assert_ne!(id1.as_str(), id2.as_str());
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_correlation_id_from_string() {
        let id = CorrelationId::from_string("test-correlation-id".to_string());

        assert_eq!(id.as_str(), "test-correlation-id");
        assert_eq!(id.to_string(), "test-correlation-id");
    }

    #[test]
    fn test_create_env_filter_never_fails() {
        for level in ["trace", "debug", "info", "warn", "error", "invalid level!"] {
            let _ = create_env_filter(&logging(level, "json", "stderr"));
        }
    }

    #[test]
    fn test_file_writer_requires_path() {
        assert!(create_writer(&logging("info", "json", "file")).is_err());

        let dir = tempfile::tempdir().unwrap();
        let mut config = logging("info", "json", "file");
        config.file_path = Some(dir.path().join("logs").join("client.log").to_string_lossy().to_string());

        let (_writer, guard) = create_writer(&config).unwrap();
        assert!(guard.is_some());
        assert!(dir.path().join("logs").exists());
    }

    #[test]
    fn test_sentry_disabled_without_dsn() {
        assert!(init_sentry(&SentryConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_mask_dsn() {
        assert_eq!(
            mask_dsn("https://abc123@o1.ingest.sentry.io/42"),
            "https://***@o1.ingest.sentry.io"
        );
        assert_eq!(mask_dsn("not a dsn"), "***");
    }
}
