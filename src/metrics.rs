use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tracing::warn;

const SERVICE_LABEL: &str = "accident-notify";

/// Gateway call metrics
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Arc<Registry>,

    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,
    pub application_info: IntGauge,
}

impl GatewayMetrics {
    /// Create a new collector with all metrics registered
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let requests_total = IntCounterVec::new(
            Opts::new(
                "gateway_requests_total",
                "Total number of backend API requests by operation and outcome",
            )
            .const_label("service", SERVICE_LABEL),
            &["operation", "outcome"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "gateway_request_duration_seconds",
                "Backend API request duration in seconds",
            )
            .const_label("service", SERVICE_LABEL)
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["operation"],
        )?;

        let application_info = IntGauge::with_opts(
            Opts::new("application_info", "Application information")
                .const_label("service", SERVICE_LABEL)
                .const_label("version", env!("CARGO_PKG_VERSION"))
                .const_label("rust_version", env!("RUSTC_VERSION"))
                .const_label("build_timestamp", env!("BUILD_TIMESTAMP")),
        )?;
        application_info.set(1);

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(application_info.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            application_info,
        })
    }

    /// Record one finished gateway call
    pub fn record_request(&self, operation: &str, outcome: &str, duration_seconds: f64) {
        self.requests_total.with_label_values(&[operation, outcome]).inc();
        self.request_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_seconds);
    }

    /// Number of calls recorded for `operation` with `outcome`
    pub fn request_count(&self, operation: &str, outcome: &str) -> u64 {
        self.requests_total.with_label_values(&[operation, outcome]).get()
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather(&self) -> String {
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        match encoder.encode_to_string(&metric_families) {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to encode metrics: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_counts_by_outcome() {
        let metrics = GatewayMetrics::new().unwrap();
        metrics.record_request("login", "success", 0.12);
        metrics.record_request("login", "success", 0.08);
        metrics.record_request("login", "rejected", 0.05);

        assert_eq!(metrics.request_count("login", "success"), 2);
        assert_eq!(metrics.request_count("login", "rejected"), 1);
        assert_eq!(metrics.request_count("logout", "success"), 0);
    }

    #[test]
    fn test_gather_renders_text_format() {
        let metrics = GatewayMetrics::new().unwrap();
        metrics.record_request("register", "no_response", 1.0);

        let output = metrics.gather();
        assert!(output.contains("gateway_requests_total"));
        assert!(output.contains("operation=\"register\""));
        assert!(output.contains("application_info"));
    }

    #[test]
    fn test_instances_have_separate_registries() {
        let a = GatewayMetrics::new().unwrap();
        let b = GatewayMetrics::new().unwrap();
        a.record_request("login", "success", 0.1);

        assert_eq!(a.request_count("login", "success"), 1);
        assert_eq!(b.request_count("login", "success"), 0);
    }
}
