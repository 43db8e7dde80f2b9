//! Metric snapshots from a PromQL endpoint
//!
//! This module provides:
//! - Query templates with typed resource placeholders
//! - The fixed query catalogs for pods, nodes and deployments
//! - A client for the Prometheus instant query API
//! - Assembly of per-resource snapshots from those pieces

mod catalog;
mod promql;
mod snapshot;
mod template;

pub use catalog::{catalog, NamedQuery, DEPLOYMENT_QUERIES, NODE_QUERIES, POD_QUERIES};
pub use promql::PrometheusClient;
pub use snapshot::{Assembled, SnapshotAssembler};
pub use template::{Placeholder, QueryTemplate};

use anyhow::Result;
use async_trait::async_trait;

/// Evaluates a fully rendered query to a scalar
#[async_trait]
pub trait MetricEvaluator: Send + Sync {
    /// `Ok(None)` when the query returns no usable value; `Err` when the
    /// metrics store could not be reached
    async fn evaluate(&self, query: &str) -> Result<Option<f64>>;
}
