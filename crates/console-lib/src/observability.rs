//! Observability infrastructure for the workload console
//!
//! Provides:
//! - Prometheus metrics (scale requests and targets, cluster errors, discovery latency)
//! - Structured JSON logging with tracing

use crate::error::ErrorKind;
use crate::models::{ScaleMode, ScaleStatus, WorkloadKind};
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for cluster round trips (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ConsoleMetricsInner> = OnceLock::new();

struct ConsoleMetricsInner {
    scale_requests: IntCounterVec,
    scale_targets: IntCounterVec,
    cluster_errors: IntCounterVec,
    discovery_latency_seconds: Histogram,
    applications_discovered: IntGauge,
}

impl ConsoleMetricsInner {
    fn new() -> Self {
        Self {
            scale_requests: register_int_counter_vec!(
                "workload_console_scale_requests_total",
                "Scale requests handled, by mode and aggregate status",
                &["mode", "status"]
            )
            .expect("Failed to register scale_requests_total"),

            scale_targets: register_int_counter_vec!(
                "workload_console_scale_targets_total",
                "Individual workload patches, by kind and result",
                &["kind", "result"]
            )
            .expect("Failed to register scale_targets_total"),

            cluster_errors: register_int_counter_vec!(
                "workload_console_errors_total",
                "Failed console operations, by error kind",
                &["kind"]
            )
            .expect("Failed to register errors_total"),

            discovery_latency_seconds: register_histogram!(
                "workload_console_discovery_latency_seconds",
                "Time spent listing and grouping workloads of a namespace",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register discovery_latency_seconds"),

            applications_discovered: register_int_gauge!(
                "workload_console_applications_discovered",
                "Applications found by the most recent grouping request"
            )
            .expect("Failed to register applications_discovered"),
        }
    }
}

/// Console metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ConsoleMetrics {
    _private: (),
}

impl Default for ConsoleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ConsoleMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ConsoleMetricsInner {
        GLOBAL_METRICS.get_or_init(ConsoleMetricsInner::new)
    }

    pub fn inc_scale_request(&self, mode: ScaleMode, status: ScaleStatus) {
        self.inner()
            .scale_requests
            .with_label_values(&[mode.as_str(), status.as_str()])
            .inc();
    }

    pub fn inc_scale_target(&self, kind: WorkloadKind, success: bool) {
        let result = if success { "applied" } else { "failed" };
        self.inner()
            .scale_targets
            .with_label_values(&[kind.as_str(), result])
            .inc();
    }

    pub fn inc_error(&self, kind: ErrorKind) {
        self.inner()
            .cluster_errors
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    #[cfg(test)]
    pub(crate) fn errors_recorded(&self, kind: ErrorKind) -> u64 {
        self.inner()
            .cluster_errors
            .with_label_values(&[kind.as_str()])
            .get()
    }

    pub fn observe_discovery_latency(&self, duration_secs: f64) {
        self.inner().discovery_latency_seconds.observe(duration_secs);
    }

    pub fn set_applications_discovered(&self, count: i64) {
        self.inner().applications_discovered.set(count);
    }
}

/// Structured logger for console events
///
/// Emits one event-typed record per significant action so scale history can
/// be reconstructed from the log stream.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, listen_addr: &str) {
        info!(
            event = "console_started",
            instance = %self.instance,
            version = %version,
            listen_addr = %listen_addr,
            "Workload console started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "console_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Workload console shutting down"
        );
    }

    pub fn log_target_scaled(&self, kind: WorkloadKind, namespace: &str, name: &str, replicas: i32) {
        info!(
            event = "workload_scaled",
            instance = %self.instance,
            kind = %kind,
            namespace = %namespace,
            name = %name,
            replicas = replicas,
            "Workload scaled"
        );
    }

    pub fn log_target_failed(
        &self,
        kind: WorkloadKind,
        namespace: &str,
        name: &str,
        error_kind: ErrorKind,
        message: &str,
    ) {
        warn!(
            event = "workload_scale_failed",
            instance = %self.instance,
            kind = %kind,
            namespace = %namespace,
            name = %name,
            error_kind = %error_kind,
            error = %message,
            "Workload scale failed"
        );
    }

    pub fn log_scale_completed(
        &self,
        mode: ScaleMode,
        namespace: &str,
        replicas: i32,
        targets: usize,
        failed: usize,
    ) {
        if failed == 0 {
            info!(
                event = "scale_completed",
                instance = %self.instance,
                mode = mode.as_str(),
                namespace = %namespace,
                replicas = replicas,
                targets = targets,
                "Scale request completed"
            );
        } else {
            warn!(
                event = "scale_completed",
                instance = %self.instance,
                mode = mode.as_str(),
                namespace = %namespace,
                replicas = replicas,
                targets = targets,
                failed = failed,
                "Scale request completed with failed targets"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_metrics_record() {
        let metrics = ConsoleMetrics::new();
        let before = metrics
            .inner()
            .scale_targets
            .with_label_values(&["StatefulSet", "failed"])
            .get();

        metrics.inc_scale_request(ScaleMode::Application, ScaleStatus::PartialFailure);
        metrics.inc_scale_target(WorkloadKind::StatefulSet, false);
        metrics.inc_error(ErrorKind::ClusterUnavailable);
        metrics.observe_discovery_latency(0.02);
        metrics.set_applications_discovered(4);

        let after = metrics
            .inner()
            .scale_targets
            .with_label_values(&["StatefulSet", "failed"])
            .get();
        assert!(after > before);
        assert_eq!(metrics.inner().applications_discovered.get(), 4);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("console-0");
        assert_eq!(logger.instance, "console-0");
    }
}
