use super::convert::{deployment_ref, event_from, node_name, pod_ref};
use super::{EventSource, ResourceLister};
use crate::models::{ClusterEvent, DeploymentRef, PodRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Node, Pod};
use kube::api::{Api, ListParams};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use tracing::{info, warn};

/// Cluster collaborator backed by the Kubernetes API, across all namespaces
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Connect using `context` from the local kubeconfig when given.
    ///
    /// An unknown or unusable context falls back to the inferred
    /// configuration: the kubeconfig's current context, then the in-cluster
    /// service account.
    pub async fn connect(context: Option<&str>) -> Result<Self> {
        let config = match context {
            Some(name) => {
                let options = KubeConfigOptions {
                    context: Some(name.to_string()),
                    ..Default::default()
                };
                match Config::from_kubeconfig(&options).await {
                    Ok(config) => {
                        info!(context = name, "Loaded kubeconfig context");
                        config
                    }
                    Err(e) => {
                        warn!(
                            context = name,
                            error = %e,
                            "Kubeconfig context unavailable, falling back to default"
                        );
                        Config::infer()
                            .await
                            .context("Failed to infer Kubernetes configuration")?
                    }
                }
            }
            None => Config::infer()
                .await
                .context("Failed to infer Kubernetes configuration")?,
        };

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceLister for KubeCluster {
    async fn list_pods(&self) -> Result<Vec<PodRef>> {
        let pods = Api::<Pod>::all(self.client.clone())
            .list(&ListParams::default())
            .await
            .context("Failed to list pods")?;
        Ok(pods.items.iter().filter_map(pod_ref).collect())
    }

    async fn list_nodes(&self) -> Result<Vec<String>> {
        let nodes = Api::<Node>::all(self.client.clone())
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;
        Ok(nodes.items.iter().filter_map(node_name).collect())
    }

    async fn list_deployments(&self) -> Result<Vec<DeploymentRef>> {
        let deployments = Api::<Deployment>::all(self.client.clone())
            .list(&ListParams::default())
            .await
            .context("Failed to list deployments")?;
        Ok(deployments.items.iter().filter_map(deployment_ref).collect())
    }
}

#[async_trait]
impl EventSource for KubeCluster {
    async fn list_events(&self) -> Result<Vec<ClusterEvent>> {
        let events = Api::<Event>::all(self.client.clone())
            .list(&ListParams::default())
            .await
            .context("Failed to list events")?;
        Ok(events.items.iter().map(event_from).collect())
    }
}
