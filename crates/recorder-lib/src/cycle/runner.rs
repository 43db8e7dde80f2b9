use super::{Clock, OwnerResolution};
use crate::classifier::{ErrorClassifier, FlagEncoding, Thresholds, DEPLOYMENT_FLAG_PREFIX};
use crate::cluster::{EventSource, ResourceLister};
use crate::error::{RecorderError, Result};
use crate::events::{for_deployment, for_node, for_pod, EventTracker};
use crate::health::{components, HealthRegistry};
use crate::metrics::{MetricEvaluator, SnapshotAssembler};
use crate::models::{ClusterEvent, DeploymentRef, MetricsSnapshot, PodRef, ResourceKind};
use crate::observability::{RecorderMetrics, StructuredLogger};
use crate::sink::{columns, Row, RowSink, TableSchema, Value};
use chrono::SecondsFormat;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Deployment identity written for pods without an owner
pub const NO_DEPLOYMENT: &str = "None";

/// External services one cycle talks to
pub struct Collaborators {
    pub lister: Arc<dyn ResourceLister>,
    pub events: Arc<dyn EventSource>,
    pub evaluator: Arc<dyn MetricEvaluator>,
    pub sink: Box<dyn RowSink>,
    pub clock: Arc<dyn Clock>,
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub tick: u64,
    pub nodes: usize,
    pub pods: usize,
    pub deployments: usize,
    pub new_events: usize,
    pub rows_written: usize,
    /// Cluster calls that failed and were treated as empty
    pub collaborator_failures: usize,
    /// Metric queries that failed and were recorded as null
    pub query_failures: usize,
    /// Tables that could not be written this tick
    pub sink_failures: usize,
}

struct Schemas {
    nodes: TableSchema,
    deployments: TableSchema,
    pods: TableSchema,
}

/// Classified data for one resource
struct Classified {
    snapshot: MetricsSnapshot,
    flags: FlagEncoding,
}

/// Executes one pass: list, deduplicate events, snapshot, correlate,
/// classify, merge and persist
pub struct CycleRunner {
    lister: Arc<dyn ResourceLister>,
    events: Arc<dyn EventSource>,
    assembler: SnapshotAssembler,
    sink: Box<dyn RowSink>,
    clock: Arc<dyn Clock>,
    tracker: EventTracker,
    nodes: ErrorClassifier,
    pods: ErrorClassifier,
    deployments: ErrorClassifier,
    owner_resolution: OwnerResolution,
    schemas: Schemas,
    health: HealthRegistry,
    metrics: RecorderMetrics,
    logger: StructuredLogger,
    ticks: u64,
}

impl CycleRunner {
    pub fn new(
        collaborators: Collaborators,
        thresholds: &Thresholds,
        owner_resolution: OwnerResolution,
        health: HealthRegistry,
        logger: StructuredLogger,
    ) -> Result<Self> {
        let nodes = ErrorClassifier::node(&thresholds.node);
        let pods = ErrorClassifier::pod(&thresholds.pod);
        let deployments = ErrorClassifier::deployment();
        let assembler = SnapshotAssembler::new(collaborators.evaluator);

        let deployment_flags: Vec<String> = deployments
            .vocabulary()
            .iter()
            .map(|name| format!("{DEPLOYMENT_FLAG_PREFIX}{name}"))
            .collect();
        let node_metrics = assembler.metric_names(ResourceKind::Node);
        let pod_metrics = assembler.metric_names(ResourceKind::Pod);
        let deployment_metrics = assembler.metric_names(ResourceKind::Deployment);

        let schemas = Schemas {
            nodes: TableSchema::nodes(&node_metrics, nodes.vocabulary())?,
            deployments: TableSchema::deployments(&deployment_metrics, deployments.vocabulary())?,
            pods: TableSchema::pods(
                (&pod_metrics, pods.vocabulary()),
                (&node_metrics, nodes.vocabulary()),
                (&deployment_metrics, &deployment_flags),
            )?,
        };

        Ok(Self {
            lister: collaborators.lister,
            events: collaborators.events,
            assembler,
            sink: collaborators.sink,
            clock: collaborators.clock,
            tracker: EventTracker::new(),
            nodes,
            pods,
            deployments,
            owner_resolution,
            schemas,
            health,
            metrics: RecorderMetrics::new(),
            logger,
            ticks: 0,
        })
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tracker(&self) -> &EventTracker {
        &self.tracker
    }

    pub fn sink_description(&self) -> String {
        self.sink.describe()
    }

    /// Run one cycle.
    ///
    /// Collaborator and I/O failures are recovered and counted in the
    /// report. Only schema drift between classifiers, schemas and rows is
    /// returned as an error.
    pub async fn tick(&mut self) -> Result<CycleReport> {
        let started = Instant::now();
        self.ticks += 1;
        let mut report = CycleReport {
            tick: self.ticks,
            ..Default::default()
        };
        let timestamp = self.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let pods = self
            .recover(&mut report, "list_pods", self.lister.list_pods())
            .await;
        let nodes = self
            .recover(&mut report, "list_nodes", self.lister.list_nodes())
            .await;
        let deployments = self
            .recover(&mut report, "list_deployments", self.lister.list_deployments())
            .await;
        let all_events = self
            .recover(&mut report, "list_events", self.events.list_events())
            .await;

        let new_events = self.tracker.new_events(all_events);
        report.nodes = nodes.len();
        report.pods = pods.len();
        report.deployments = deployments.len();
        report.new_events = new_events.len();

        let node_data = self.classify_nodes(&nodes, &new_events, &mut report).await?;
        let deployment_data = self
            .classify_deployments(&deployments, &new_events, &mut report)
            .await?;

        let mut node_rows = Vec::with_capacity(node_data.len());
        for name in &nodes {
            if let Some(data) = node_data.get(name) {
                let mut row = Row::new();
                row.set(columns::TIMESTAMP, timestamp.as_str());
                row.set(columns::NODE, name.as_str());
                fill(&mut row, data);
                node_rows.push(row);
            }
        }

        let mut deployment_rows = Vec::with_capacity(deployment_data.len());
        for deployment in &deployments {
            if let Some(data) = deployment_data.get(&deployment.key()) {
                let mut row = Row::new();
                row.set(columns::TIMESTAMP, timestamp.as_str());
                row.set(columns::NAMESPACE, deployment.namespace.as_str());
                row.set(columns::DEPLOYMENT, deployment.name.as_str());
                fill(&mut row, data);
                deployment_rows.push(row);
            }
        }

        let mut pod_rows = Vec::with_capacity(pods.len());
        for pod in &pods {
            let pod_data = self.classify_pod(pod, &new_events, &mut report).await?;
            let owner = self.owner_resolution.resolve(pod, &deployments);
            pod_rows.push(self.merged_row(
                &timestamp,
                pod,
                &pod_data,
                pod.node.as_ref().and_then(|n| node_data.get(n)),
                owner.and_then(|d| deployment_data.get(&d.key()).map(|data| (d, data))),
            ));
        }

        self.persist(SchemaSlot::Nodes, &node_rows, &mut report)?;
        self.persist(SchemaSlot::Deployments, &deployment_rows, &mut report)?;
        self.persist(SchemaSlot::Pods, &pod_rows, &mut report)?;

        self.update_health(&report).await;
        self.metrics.observe_cycle(started.elapsed().as_secs_f64());
        self.metrics.add_new_events(report.new_events);
        self.metrics.add_query_failures(report.query_failures);
        self.metrics
            .set_resources_observed(ResourceKind::Node, report.nodes);
        self.metrics.set_resources_observed(ResourceKind::Pod, report.pods);
        self.metrics
            .set_resources_observed(ResourceKind::Deployment, report.deployments);
        self.logger.log_cycle(
            report.tick,
            report.nodes,
            report.pods,
            report.new_events,
            report.rows_written,
        );

        Ok(report)
    }

    /// Log-and-empty boundary for cluster calls
    async fn recover<T>(
        &self,
        report: &mut CycleReport,
        operation: &str,
        call: impl Future<Output = anyhow::Result<Vec<T>>>,
    ) -> Vec<T> {
        match call.await {
            Ok(items) => items,
            Err(e) => {
                report.collaborator_failures += 1;
                self.metrics.inc_collaborator_failure(components::CLUSTER);
                self.logger
                    .log_collaborator_failure(components::CLUSTER, operation, &format!("{e:#}"));
                Vec::new()
            }
        }
    }

    async fn snapshot(
        &self,
        kind: ResourceKind,
        name: &str,
        report: &mut CycleReport,
    ) -> MetricsSnapshot {
        let assembled = self.assembler.snapshot(kind, name).await;
        report.query_failures += assembled.failed_queries;
        assembled.snapshot
    }

    fn classify(
        &self,
        classifier: &ErrorClassifier,
        name: &str,
        snapshot: MetricsSnapshot,
        related: &[&ClusterEvent],
    ) -> Result<Classified> {
        let detected = classifier.classify(&snapshot, related);
        let flags = classifier.encode(&detected)?;

        let active = flags.active();
        for condition in &active {
            self.metrics.inc_condition(classifier.kind(), condition);
        }
        self.logger.log_conditions(classifier.kind(), name, &active);

        Ok(Classified { snapshot, flags })
    }

    async fn classify_nodes(
        &self,
        nodes: &[String],
        new_events: &[ClusterEvent],
        report: &mut CycleReport,
    ) -> Result<HashMap<String, Classified>> {
        let mut data = HashMap::with_capacity(nodes.len());
        for name in nodes {
            let snapshot = self.snapshot(ResourceKind::Node, name, report).await;
            let related = for_node(new_events, name);
            let classified = self.classify(&self.nodes, name, snapshot, &related)?;
            data.insert(name.clone(), classified);
        }
        Ok(data)
    }

    async fn classify_deployments(
        &self,
        deployments: &[DeploymentRef],
        new_events: &[ClusterEvent],
        report: &mut CycleReport,
    ) -> Result<HashMap<String, Classified>> {
        let mut data = HashMap::with_capacity(deployments.len());
        for deployment in deployments {
            let snapshot = self
                .snapshot(ResourceKind::Deployment, &deployment.name, report)
                .await;
            let related = for_deployment(new_events, &deployment.namespace, &deployment.name);
            let classified =
                self.classify(&self.deployments, &deployment.key(), snapshot, &related)?;
            data.insert(deployment.key(), classified);
        }
        Ok(data)
    }

    async fn classify_pod(
        &self,
        pod: &PodRef,
        new_events: &[ClusterEvent],
        report: &mut CycleReport,
    ) -> Result<Classified> {
        let snapshot = self.snapshot(ResourceKind::Pod, &pod.name, report).await;
        let related = for_pod(new_events, &pod.namespace, &pod.name);
        let key = format!("{}/{}", pod.namespace, pod.name);
        self.classify(&self.pods, &key, snapshot, &related)
    }

    /// Pod identity and data, its node's data (null when the node is not
    /// listed) and its owner's data (zero when there is no owner)
    fn merged_row(
        &self,
        timestamp: &str,
        pod: &PodRef,
        pod_data: &Classified,
        node: Option<&Classified>,
        owner: Option<(&DeploymentRef, &Classified)>,
    ) -> Row {
        let mut row = Row::new();
        row.set(columns::TIMESTAMP, timestamp);
        row.set(columns::NAMESPACE, pod.namespace.as_str());
        row.set(columns::POD, pod.name.as_str());
        row.set(
            columns::NODE,
            pod.node.as_deref().map_or(Value::Null, Value::from),
        );
        fill(&mut row, pod_data);

        if let Some(node) = node {
            fill(&mut row, node);
        }

        match owner {
            Some((deployment, data)) => {
                row.set(columns::DEPLOYMENT, deployment.key());
                for (metric, value) in data.snapshot.iter() {
                    row.set(metric, value);
                }
                for (name, flag) in data.flags.prefixed(DEPLOYMENT_FLAG_PREFIX).iter() {
                    row.set(name, flag);
                }
            }
            None => {
                row.set(columns::DEPLOYMENT, NO_DEPLOYMENT);
                for metric in self.assembler.metric_names(ResourceKind::Deployment) {
                    row.set(metric, 0.0);
                }
                for name in self.deployments.vocabulary() {
                    row.set(format!("{DEPLOYMENT_FLAG_PREFIX}{name}"), 0u8);
                }
            }
        }

        row
    }

    fn persist(
        &mut self,
        slot: SchemaSlot,
        rows: &[Row],
        report: &mut CycleReport,
    ) -> Result<()> {
        let schema = match slot {
            SchemaSlot::Nodes => &self.schemas.nodes,
            SchemaSlot::Deployments => &self.schemas.deployments,
            SchemaSlot::Pods => &self.schemas.pods,
        };

        match self.sink.append_rows(schema, rows) {
            Ok(written) => {
                report.rows_written += written;
                self.metrics.add_rows_written(schema.name(), written);
                debug!(table = schema.name(), rows = written, "Persisted table");
                Ok(())
            }
            Err(e) if e.is_schema_drift() => Err(RecorderError::Sink(e)),
            Err(e) => {
                report.sink_failures += 1;
                warn!(table = schema.name(), error = %e, "Failed to persist rows");
                Ok(())
            }
        }
    }

    async fn update_health(&self, report: &CycleReport) {
        if report.collaborator_failures > 0 {
            self.health
                .set_degraded(
                    components::CLUSTER,
                    format!("{} cluster calls failed", report.collaborator_failures),
                )
                .await;
        } else {
            self.health.set_healthy(components::CLUSTER).await;
        }

        if report.query_failures > 0 {
            self.health
                .set_degraded(
                    components::METRICS_STORE,
                    format!("{} metric queries failed", report.query_failures),
                )
                .await;
        } else {
            self.health.set_healthy(components::METRICS_STORE).await;
        }

        if report.sink_failures > 0 {
            self.health
                .set_degraded(
                    components::SINK,
                    format!("{} tables not written", report.sink_failures),
                )
                .await;
        } else {
            self.health.set_healthy(components::SINK).await;
            self.health
                .record_cycle(report.tick, report.rows_written)
                .await;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SchemaSlot {
    Nodes,
    Deployments,
    Pods,
}

fn fill(row: &mut Row, data: &Classified) {
    for (metric, value) in data.snapshot.iter() {
        row.set(metric, value);
    }
    for (name, flag) in data.flags.iter() {
        row.set(name, flag);
    }
}
