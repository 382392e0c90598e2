//! Metrics registry for the randomized responder.
//!
//! Every handled request produces one instrumentation record: a duration observation,
//! a size observation and a counter increment, all labeled by `(path, method, status)`.
//! The series names and buckets are consumed by external dashboards and must not change.

use log::error;
use prometheus::process_collector::ProcessCollector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;
use thiserror::Error;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_RESPONSE_DURATION_SECONDS: &str = "http_response_duration_seconds";
pub const HTTP_RESPONSE_SIZE_BYTES: &str = "http_response_size_bytes";

pub const LABEL_NAMES: [&str; 3] = ["path", "method", "status"];

pub const DURATION_BUCKETS: [f64; 7] = [0.030, 0.1, 0.5, 1f64, 10f64, 30f64, 60f64];
pub const SIZE_BUCKETS: [f64; 5] = [500f64, 1000f64, 350_000f64, 500_000f64, 1_000_000f64];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("exported metrics are not valid utf8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Label values of a single instrumentation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub status: &'a str,
}

impl<'a> RequestLabels<'a> {
    pub fn new(path: &'a str, method: &'a str, status: &'a str) -> Self {
        RequestLabels {
            path,
            method,
            status,
        }
    }

    fn values(&self) -> [&str; 3] {
        [self.path, self.method, self.status]
    }
}

pub struct PlaygroundMetrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_response_duration_seconds: HistogramVec,
    http_response_size_bytes: HistogramVec,
}

impl PlaygroundMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();
        let pc = ProcessCollector::for_self();
        if let Err(e) = registry.register(Box::new(pc)) {
            error!("failed to register process collector: {}", e);
        }

        let opts = Opts::new(
            HTTP_REQUESTS_TOTAL,
            "A monotonically increasing count of handled requests",
        );
        let http_requests_total = IntCounterVec::new(opts, &LABEL_NAMES)?;

        let mut opts = HistogramOpts::new(
            HTTP_RESPONSE_DURATION_SECONDS,
            "A histogram of http response latency distributions",
        );
        opts.buckets = Vec::from(DURATION_BUCKETS);
        let http_response_duration_seconds = HistogramVec::new(opts, &LABEL_NAMES)?;

        let mut opts = HistogramOpts::new(
            HTTP_RESPONSE_SIZE_BYTES,
            "A histogram of http response size distributions",
        );
        opts.buckets = Vec::from(SIZE_BUCKETS);
        let http_response_size_bytes = HistogramVec::new(opts, &LABEL_NAMES)?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_response_duration_seconds.clone()))?;
        registry.register(Box::new(http_response_size_bytes.clone()))?;

        Ok(PlaygroundMetrics {
            registry,
            http_requests_total,
            http_response_duration_seconds,
            http_response_size_bytes,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the full instrumentation record of one handled request.
    ///
    /// All three series are resolved with the same label values before any of them is
    /// updated.
    pub fn record(&self, labels: &RequestLabels<'_>, duration: Duration, size_bytes: u64) {
        let values = labels.values();
        let duration_seconds = self
            .http_response_duration_seconds
            .with_label_values(&values);
        let size = self.http_response_size_bytes.with_label_values(&values);
        let count = self.http_requests_total.with_label_values(&values);

        duration_seconds.observe(duration.as_secs_f64());
        size.observe(size_bytes as f64);
        count.inc();
    }

    /// Render all registered metrics in prometheus text exposition format
    pub fn encode(&self) -> Result<Vec<u8>, MetricsError> {
        let encoder = TextEncoder::new();
        let metrics = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metrics, &mut buffer)?;
        Ok(buffer)
    }

    pub fn encode_to_string(&self) -> Result<String, MetricsError> {
        Ok(String::from_utf8(self.encode()?)?)
    }

    pub fn format_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
