//! Core data models for the recorder

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource kinds that get a row, a vocabulary and a query catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Node,
    Pod,
    Deployment,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Node => write!(f, "node"),
            ResourceKind::Pod => write!(f, "pod"),
            ResourceKind::Deployment => write!(f, "deployment"),
        }
    }
}

/// Kind of the object an event refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Node,
    Pod,
    Deployment,
    Other(String),
}

impl ObjectKind {
    /// Parse the `involvedObject.kind` string. Matching is exact.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "Node" => ObjectKind::Node,
            "Pod" => ObjectKind::Pod,
            "Deployment" => ObjectKind::Deployment,
            other => ObjectKind::Other(other.to_string()),
        }
    }
}

impl From<ResourceKind> for ObjectKind {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Node => ObjectKind::Node,
            ResourceKind::Pod => ObjectKind::Pod,
            ResourceKind::Deployment => ObjectKind::Deployment,
        }
    }
}

/// Reference from an event to the resource it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvolvedObject {
    pub kind: ObjectKind,
    pub namespace: Option<String>,
    pub name: String,
}

/// A cluster event as observed by one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEvent {
    pub uid: String,
    pub involved_object: InvolvedObject,
    pub message_fragments: Vec<String>,
}

impl ClusterEvent {
    pub fn new(
        uid: impl Into<String>,
        involved_object: InvolvedObject,
        message: Option<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            involved_object,
            message_fragments: message.into_iter().collect(),
        }
    }

    /// Message text used for marker matching
    pub fn text(&self) -> String {
        self.message_fragments.concat()
    }
}

/// A pod as listed from the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
    pub node: Option<String>,
    /// Name of the controlling ReplicaSet, if any
    pub replica_set: Option<String>,
    /// Value of the `pod-template-hash` label, if any
    pub pod_template_hash: Option<String>,
}

impl PodRef {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        node: Option<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            node,
            replica_set: None,
            pod_template_hash: None,
        }
    }
}

/// A deployment as listed from the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentRef {
    pub namespace: String,
    pub name: String,
}

impl DeploymentRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity written to output rows, `namespace/name`
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Metric values for one resource instance at one point in time
///
/// Keys keep the order of the query catalog that produced them and every
/// catalog name is present; unavailable values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    values: Vec<(String, Option<f64>)>,
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metric, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: Option<f64>) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Value of a metric; `None` when missing or null
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| *v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<f64>)> for MetricsSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, Option<f64>)>>(iter: I) -> Self {
        let mut snapshot = MetricsSnapshot::new();
        for (name, value) in iter {
            snapshot.insert(name, value);
        }
        snapshot
    }
}
