//! Cluster API collaborators
//!
//! The orchestrator only sees the two traits below. `KubeCluster` is the
//! production implementation backed by the Kubernetes API.

mod client;
mod convert;

pub use client::KubeCluster;
pub use convert::{deployment_ref, event_from, node_name, pod_ref};

use crate::models::{ClusterEvent, DeploymentRef, PodRef};
use anyhow::Result;
use async_trait::async_trait;

/// Lists the resources present in the cluster right now
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list_pods(&self) -> Result<Vec<PodRef>>;

    async fn list_nodes(&self) -> Result<Vec<String>>;

    async fn list_deployments(&self) -> Result<Vec<DeploymentRef>>;
}

/// Lists every event the cluster currently retains
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(&self) -> Result<Vec<ClusterEvent>>;
}
