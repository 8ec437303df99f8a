//! Metrics collector port: per-stage latency and queue depth, recorded by
//! the application/infrastructure layers and exported by whichever adapter
//! the composition root wires in. Ambient observability, not a pipeline
//! stage — every component from the Ingestion Orchestrator down to the
//! Hybrid Retriever records through this one interface.

use std::time::Duration;

/// Collects timing and depth samples for the ingestion/retrieval core.
///
/// `stage` identifies the component emitting the sample (e.g.
/// `"text_extractor"`, `"dense_embedder"`, `"hybrid_retriever"`); `queue`
/// identifies a lane or notification queue by its configured name.
pub trait MetricsCollector: Send + Sync {
    /// Record how long a stage took and whether it succeeded.
    fn record_stage_latency(&self, stage: &str, duration: Duration, success: bool);

    /// Record the current depth of a queue, sampled after a receive/send.
    fn record_queue_depth(&self, queue: &str, depth: u64);
}

/// No-op collector: the default when no exporter is configured.
pub struct NullMetricsCollector;

impl MetricsCollector for NullMetricsCollector {
    fn record_stage_latency(&self, _stage: &str, _duration: Duration, _success: bool) {}
    fn record_queue_depth(&self, _queue: &str, _depth: u64) {}
}
