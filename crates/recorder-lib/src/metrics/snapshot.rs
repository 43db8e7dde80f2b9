//! Per-resource metric snapshots

use super::{catalog, MetricEvaluator, Placeholder, QueryTemplate};
use crate::models::{MetricsSnapshot, ResourceKind};
use std::sync::Arc;
use tracing::warn;

/// Outcome of assembling one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub snapshot: MetricsSnapshot,
    /// Queries whose evaluation failed and were recorded as absent
    pub failed_queries: usize,
}

/// Renders a catalog for one resource and evaluates every query
pub struct SnapshotAssembler {
    evaluator: Arc<dyn MetricEvaluator>,
    pods: Vec<(&'static str, QueryTemplate)>,
    nodes: Vec<(&'static str, QueryTemplate)>,
    deployments: Vec<(&'static str, QueryTemplate)>,
}

fn compile(kind: ResourceKind) -> Vec<(&'static str, QueryTemplate)> {
    let placeholder = Placeholder::from(kind);
    catalog(kind)
        .iter()
        .map(|q| (q.name, QueryTemplate::new(q.template, placeholder)))
        .collect()
}

impl SnapshotAssembler {
    pub fn new(evaluator: Arc<dyn MetricEvaluator>) -> Self {
        Self {
            evaluator,
            pods: compile(ResourceKind::Pod),
            nodes: compile(ResourceKind::Node),
            deployments: compile(ResourceKind::Deployment),
        }
    }

    fn templates(&self, kind: ResourceKind) -> &[(&'static str, QueryTemplate)] {
        match kind {
            ResourceKind::Pod => &self.pods,
            ResourceKind::Node => &self.nodes,
            ResourceKind::Deployment => &self.deployments,
        }
    }

    /// Metric names for `kind` in column order
    pub fn metric_names(&self, kind: ResourceKind) -> Vec<&'static str> {
        self.templates(kind).iter().map(|(name, _)| *name).collect()
    }

    /// Evaluate every query in the catalog for `kind` against `name`.
    ///
    /// Every catalog entry appears in the snapshot. A failed evaluation is
    /// logged and recorded as absent.
    pub async fn snapshot(&self, kind: ResourceKind, name: &str) -> Assembled {
        let templates = self.templates(kind);
        let mut snapshot = MetricsSnapshot::new();
        let mut failed_queries = 0;

        for (metric, template) in templates {
            let query = template.render(name);
            let value = match self.evaluator.evaluate(&query).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        resource_kind = %kind,
                        resource = name,
                        metric = *metric,
                        error = %e,
                        "Metric query failed"
                    );
                    failed_queries += 1;
                    None
                }
            };
            snapshot.insert(*metric, value);
        }

        Assembled {
            snapshot,
            failed_queries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers by substring and records every query it sees
    struct ScriptedEvaluator {
        answers: Vec<(&'static str, Result<Option<f64>, &'static str>)>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedEvaluator {
        fn new(answers: Vec<(&'static str, Result<Option<f64>, &'static str>)>) -> Self {
            Self {
                answers,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MetricEvaluator for ScriptedEvaluator {
        async fn evaluate(&self, query: &str) -> Result<Option<f64>> {
            self.seen.lock().unwrap().push(query.to_string());
            for (needle, answer) in &self.answers {
                if query.contains(needle) {
                    return (*answer).map_err(|e| anyhow::anyhow!(e));
                }
            }
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_snapshot_covers_whole_catalog() {
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let assembler = SnapshotAssembler::new(evaluator.clone());

        let assembled = assembler.snapshot(ResourceKind::Node, "worker-1").await;

        assert_eq!(assembled.snapshot.len(), catalog(ResourceKind::Node).len());
        assert_eq!(assembled.failed_queries, 0);
        let names: Vec<_> = assembled.snapshot.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, assembler.metric_names(ResourceKind::Node));
    }

    #[tokio::test]
    async fn test_queries_are_rendered_with_name() {
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let assembler = SnapshotAssembler::new(evaluator.clone());

        assembler.snapshot(ResourceKind::Pod, "web-7c9f").await;

        let seen = evaluator.seen.lock().unwrap();
        assert_eq!(seen.len(), catalog(ResourceKind::Pod).len());
        assert!(seen.iter().all(|q| !q.contains("{pod}")));
        assert!(seen.iter().all(|q| q.contains("web-7c9f")));
    }

    #[tokio::test]
    async fn test_values_and_failures() {
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![
            ("kube_deployment_spec_replicas{", Ok(Some(3.0))),
            ("kube_deployment_status_available_replicas", Err("connection refused")),
        ]));
        let assembler = SnapshotAssembler::new(evaluator);

        let assembled = assembler.snapshot(ResourceKind::Deployment, "api").await;

        assert_eq!(assembled.snapshot.get("deployment_replicas"), Some(3.0));
        assert!(assembled.snapshot.contains("deployment_available_replicas"));
        assert_eq!(assembled.snapshot.get("deployment_available_replicas"), None);
        assert_eq!(assembled.failed_queries, 1);
    }
}
