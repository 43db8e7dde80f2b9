//! Observability for the recorder
//!
//! Provides:
//! - Prometheus metrics (cycle latency, rows persisted, events, failures)
//! - Structured JSON log events with tracing

use crate::models::ResourceKind;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge_vec,
    Histogram, IntCounter, IntCounterVec, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Cycle latency buckets (in seconds)
const CYCLE_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

static GLOBAL_METRICS: OnceLock<RecorderMetricsInner> = OnceLock::new();

struct RecorderMetricsInner {
    cycle_duration_seconds: Histogram,
    cycles: IntCounter,
    resources_observed: IntGaugeVec,
    rows_written: IntCounterVec,
    new_events: IntCounter,
    conditions_detected: IntCounterVec,
    query_failures: IntCounter,
    collaborator_failures: IntCounterVec,
}

impl RecorderMetricsInner {
    fn new() -> Self {
        Self {
            cycle_duration_seconds: register_histogram!(
                "health_recorder_cycle_duration_seconds",
                "Wall time of one collection cycle",
                CYCLE_BUCKETS.to_vec()
            )
            .expect("Failed to register cycle_duration_seconds"),

            cycles: register_int_counter!(
                "health_recorder_cycles_total",
                "Completed collection cycles"
            )
            .expect("Failed to register cycles_total"),

            resources_observed: register_int_gauge_vec!(
                "health_recorder_resources_observed",
                "Resources listed in the latest cycle",
                &["kind"]
            )
            .expect("Failed to register resources_observed"),

            rows_written: register_int_counter_vec!(
                "health_recorder_rows_written_total",
                "Rows persisted per table",
                &["table"]
            )
            .expect("Failed to register rows_written_total"),

            new_events: register_int_counter!(
                "health_recorder_new_events_total",
                "Cluster events seen for the first time"
            )
            .expect("Failed to register new_events_total"),

            conditions_detected: register_int_counter_vec!(
                "health_recorder_conditions_detected_total",
                "Error conditions detected per resource kind",
                &["kind", "condition"]
            )
            .expect("Failed to register conditions_detected_total"),

            query_failures: register_int_counter!(
                "health_recorder_query_failures_total",
                "Metric queries that failed and were recorded as absent"
            )
            .expect("Failed to register query_failures_total"),

            collaborator_failures: register_int_counter_vec!(
                "health_recorder_collaborator_failures_total",
                "Failed calls to the cluster API or the metrics store",
                &["component"]
            )
            .expect("Failed to register collaborator_failures_total"),
        }
    }
}

/// Handle to the process-wide recorder metrics
///
/// Clones share the same underlying collectors.
#[derive(Clone)]
pub struct RecorderMetrics {
    _private: (),
}

impl Default for RecorderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(RecorderMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &RecorderMetricsInner {
        GLOBAL_METRICS.get_or_init(RecorderMetricsInner::new)
    }

    pub fn observe_cycle(&self, duration_secs: f64) {
        self.inner().cycle_duration_seconds.observe(duration_secs);
        self.inner().cycles.inc();
    }

    pub fn set_resources_observed(&self, kind: ResourceKind, count: usize) {
        self.inner()
            .resources_observed
            .with_label_values(&[&kind.to_string()])
            .set(count as i64);
    }

    pub fn add_rows_written(&self, table: &str, rows: usize) {
        self.inner()
            .rows_written
            .with_label_values(&[table])
            .inc_by(rows as u64);
    }

    pub fn add_new_events(&self, count: usize) {
        self.inner().new_events.inc_by(count as u64);
    }

    pub fn inc_condition(&self, kind: ResourceKind, condition: &str) {
        self.inner()
            .conditions_detected
            .with_label_values(&[&kind.to_string(), condition])
            .inc();
    }

    pub fn add_query_failures(&self, count: usize) {
        self.inner().query_failures.inc_by(count as u64);
    }

    pub fn inc_collaborator_failure(&self, component: &str) {
        self.inner()
            .collaborator_failures
            .with_label_values(&[component])
            .inc();
    }

    pub fn cycles(&self) -> u64 {
        self.inner().cycles.get()
    }
}

/// Structured logger for recorder events
#[derive(Clone)]
pub struct StructuredLogger {
    cluster: String,
}

impl StructuredLogger {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
        }
    }

    pub fn log_startup(&self, version: &str, prometheus_url: &str, output: &str) {
        info!(
            event = "recorder_started",
            cluster = %self.cluster,
            recorder_version = %version,
            prometheus_url = %prometheus_url,
            output = %output,
            "Health recorder started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "recorder_shutdown",
            cluster = %self.cluster,
            reason = %reason,
            "Health recorder shutting down"
        );
    }

    pub fn log_cycle(&self, tick: u64, nodes: usize, pods: usize, new_events: usize, rows: usize) {
        info!(
            event = "cycle_completed",
            cluster = %self.cluster,
            tick = tick,
            nodes = nodes,
            pods = pods,
            new_events = new_events,
            rows_written = rows,
            "Collection cycle completed"
        );
    }

    /// Logs only when at least one condition fired
    pub fn log_conditions(&self, kind: ResourceKind, resource: &str, conditions: &[&str]) {
        if conditions.is_empty() {
            return;
        }
        info!(
            event = "conditions_detected",
            cluster = %self.cluster,
            resource_kind = %kind,
            resource = %resource,
            conditions = ?conditions,
            "Error conditions detected"
        );
    }

    pub fn log_collaborator_failure(&self, component: &str, operation: &str, error: &str) {
        warn!(
            event = "collaborator_failed",
            cluster = %self.cluster,
            component = %component,
            operation = %operation,
            error = %error,
            "Collaborator call failed, continuing with empty result"
        );
    }

    pub fn log_fatal(&self, tick: u64, error: &str) {
        error!(
            event = "cycle_aborted",
            cluster = %self.cluster,
            tick = tick,
            error = %error,
            "Collection cycle aborted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_metrics_shared() {
        let metrics = RecorderMetrics::new();
        let other = metrics.clone();
        let before = metrics.cycles();

        metrics.observe_cycle(0.2);
        other.observe_cycle(0.4);
        metrics.set_resources_observed(ResourceKind::Pod, 7);
        metrics.add_rows_written("pods", 7);
        metrics.add_new_events(2);
        metrics.inc_condition(ResourceKind::Node, "High CPU Usage");
        metrics.add_query_failures(1);
        metrics.inc_collaborator_failure("cluster");

        assert!(metrics.cycles() >= before + 2);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("kind-clusterbusters");
        assert_eq!(logger.cluster, "kind-clusterbusters");
        logger.log_conditions(ResourceKind::Pod, "web-1", &[]);
    }
}
