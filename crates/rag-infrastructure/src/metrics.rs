//! Prometheus-backed [`MetricsCollector`](rag_domain::ports::metrics::MetricsCollector),
//! wired into the composition root but inert unless an operator mounts the
//! `/metrics` route on the server. Global registry, same shape as the
//! teacher's own Prometheus adapter: metrics are registered once and
//! reused across every clone of the collector.

use std::sync::OnceLock;
use std::time::Duration;

use prometheus::{register_gauge_vec, register_histogram_vec, GaugeVec, HistogramVec};
use rag_domain::ports::metrics::MetricsCollector;

const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

struct Metrics {
    stage_latency: HistogramVec,
    queue_depth: GaugeVec,
}

static METRICS: OnceLock<Result<Metrics, String>> = OnceLock::new();

impl Metrics {
    fn try_new() -> Result<Self, String> {
        Ok(Self {
            stage_latency: register_histogram_vec!(
                "rag_stage_latency_seconds",
                "Pipeline stage duration in seconds",
                &["stage", "success"],
                LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| format!("failed to register rag_stage_latency_seconds: {e}"))?,
            queue_depth: register_gauge_vec!(
                "rag_queue_depth",
                "Last observed depth of a lane or notification queue",
                &["queue"]
            )
            .map_err(|e| format!("failed to register rag_queue_depth: {e}"))?,
        })
    }
}

/// Collector backed by the process-global Prometheus registry.
pub struct PrometheusMetrics;

impl PrometheusMetrics {
    pub fn new() -> Self {
        if let Err(e) = METRICS.get_or_init(Metrics::try_new) {
            tracing::error!(error = %e, "failed to initialize prometheus metrics");
        }
        Self
    }

    fn metrics(&self) -> Option<&Metrics> {
        METRICS.get().and_then(|r| r.as_ref().ok())
    }
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector for PrometheusMetrics {
    fn record_stage_latency(&self, stage: &str, duration: Duration, success: bool) {
        if let Some(metrics) = self.metrics() {
            let success = if success { "true" } else { "false" };
            metrics
                .stage_latency
                .with_label_values(&[stage, success])
                .observe(duration.as_secs_f64());
        }
    }

    fn record_queue_depth(&self, queue: &str, depth: u64) {
        if let Some(metrics) = self.metrics() {
            metrics.queue_depth.with_label_values(&[queue]).set(depth as f64);
        }
    }
}

/// Render the process-global registry in Prometheus text exposition format,
/// for the `/metrics` route.
pub fn export() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer).ok();
    String::from_utf8(buffer).unwrap_or_default()
}
