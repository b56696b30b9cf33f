// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for module operations
// ============================================================================
//
// - Operation outcomes and latency per repository operation
// - Optimistic concurrency conflicts
// - Retry attempts
//
// Scraped via /metrics on the metrics server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub module_operations: IntCounterVec,
    pub module_operation_duration: HistogramVec,
    pub optimistic_conflicts: IntCounterVec,
    pub retry_attempts_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let module_operations = IntCounterVec::new(
            Opts::new("module_operations_total", "Module repository operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(module_operations.clone()))?;

        let module_operation_duration = HistogramVec::new(
            HistogramOpts::new("module_operation_duration_seconds", "Module repository operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(module_operation_duration.clone()))?;

        let optimistic_conflicts = IntCounterVec::new(
            Opts::new("optimistic_conflicts_total", "Course writes rejected by a version check"),
            &["operation"],
        )?;
        registry.register(Box::new(optimistic_conflicts.clone()))?;

        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Total retry attempts"),
            &["operation", "attempt"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        Ok(Self {
            registry,
            module_operations,
            module_operation_duration,
            optimistic_conflicts,
            retry_attempts_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_operation(&self, operation: &str, duration_secs: f64, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.module_operations.with_label_values(&[operation, outcome]).inc();
        self.module_operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }

    pub fn record_conflict(&self, operation: &str) {
        self.optimistic_conflicts.with_label_values(&[operation]).inc();
    }

    pub fn record_retry_attempt(&self, operation: &str, attempt: u32) {
        self.retry_attempts_total.with_label_values(&[operation, &attempt.to_string()]).inc();
    }
}
