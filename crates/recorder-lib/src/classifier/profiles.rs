//! Built-in vocabularies and rules for nodes, pods and deployments

use super::rules::{ConditionRule, Rule};
use super::ClassifierProfile;
use crate::models::ResourceKind;
use serde::{Deserialize, Serialize};

/// Node conditions, in column order
pub const NODE_CONDITIONS: [&str; 7] = [
    "CPU Pressure",
    "Memory Pressure",
    "Disk Pressure",
    "Network Unavailable",
    "Node Not Ready",
    "PID Pressure",
    "Node Unschedulable",
];

/// Pod conditions, in column order
pub const POD_CONDITIONS: [&str; 8] = [
    "CPU Throttling",
    "High CPU Usage",
    "OOMKilled (Out of Memory)",
    "CrashLoopBackOff",
    "ContainerNotReady",
    "PodUnschedulable",
    "NodePressure",
    "ImagePullFailure",
];

/// Deployment conditions, in column order
pub const DEPLOYMENT_CONDITIONS: [&str; 7] = [
    "Replica Mismatch",
    "Unavailable Pods",
    "ImagePullFailure",
    "CrashLoopBackOff",
    "FailedScheduling",
    "QuotaExceeded",
    "ProgressDeadlineExceeded",
];

/// Deployment flag columns are written as `deployment <condition>`
pub const DEPLOYMENT_FLAG_PREFIX: &str = "deployment ";

/// Image pull back-offs are not pod crash loops
const IMAGE_PULL_BACKOFF: &str = "Back-off pulling image";

/// Metric thresholds used by the classifiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub node: NodeThresholds,
    pub pod: PodThresholds,
}

/// Node thresholds, all in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeThresholds {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
}

impl Default for NodeThresholds {
    fn default() -> Self {
        Self {
            cpu_usage: 80.0,
            memory_usage: 90.0,
            disk_usage: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodThresholds {
    /// Percent of the CPU limit
    pub cpu_usage: f64,
    /// Throttled seconds per second
    pub cpu_throttling: f64,
}

impl Default for PodThresholds {
    fn default() -> Self {
        Self {
            cpu_usage: 80.0,
            cpu_throttling: 0.75,
        }
    }
}

fn vocabulary(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub(super) fn node_profile(t: &NodeThresholds) -> ClassifierProfile {
    ClassifierProfile {
        kind: ResourceKind::Node,
        vocabulary: vocabulary(&NODE_CONDITIONS),
        rules: vec![
            ConditionRule::new("CPU Pressure", Rule::above("node_cpu_usage", t.cpu_usage)),
            ConditionRule::new(
                "Memory Pressure",
                Rule::above("node_memory_usage", t.memory_usage),
            ),
            ConditionRule::new("Memory Pressure", Rule::mentions(&["MemoryPressure"])),
            ConditionRule::new("Disk Pressure", Rule::above("node_disk_usage", t.disk_usage)),
            ConditionRule::new("Disk Pressure", Rule::equals("node_disk_pressure", 1.0)),
            ConditionRule::new("Disk Pressure", Rule::mentions(&["DiskPressure"])),
            ConditionRule::new("Network Unavailable", Rule::mentions(&["NetworkUnavailable"])),
            ConditionRule::new("Node Not Ready", Rule::mentions(&["NodeNotReady"])),
            ConditionRule::new("PID Pressure", Rule::mentions(&["PIDPressure"])),
            ConditionRule::new(
                "Node Unschedulable",
                Rule::mentions(&["Taint", "node.kubernetes.io/unsche"]),
            ),
        ],
    }
}

pub(super) fn pod_profile(t: &PodThresholds) -> ClassifierProfile {
    ClassifierProfile {
        kind: ResourceKind::Pod,
        vocabulary: vocabulary(&POD_CONDITIONS),
        rules: vec![
            ConditionRule::new("CPU Throttling", Rule::above("cpu_throttling", t.cpu_throttling)),
            ConditionRule::new("High CPU Usage", Rule::above("cpu_usage", t.cpu_usage)),
            ConditionRule::new("OOMKilled (Out of Memory)", Rule::mentions(&["OOMKilled"])),
            ConditionRule::new(
                "CrashLoopBackOff",
                Rule::mentions(&["Back-off"]).unless(IMAGE_PULL_BACKOFF),
            ),
            ConditionRule::new(
                "ContainerNotReady",
                Rule::mentions(&["ContainerCreating", IMAGE_PULL_BACKOFF]),
            ),
            ConditionRule::new("PodUnschedulable", Rule::mentions(&["FailedScheduling"])),
            ConditionRule::new(
                "NodePressure",
                Rule::mentions(&["MemoryPressure", "DiskPressure"]),
            ),
            ConditionRule::new(
                "ImagePullFailure",
                Rule::mentions(&["ErrImagePull", "ImagePullBackOff"]),
            ),
        ],
    }
}

pub(super) fn deployment_profile() -> ClassifierProfile {
    ClassifierProfile {
        kind: ResourceKind::Deployment,
        vocabulary: vocabulary(&DEPLOYMENT_CONDITIONS),
        rules: vec![
            ConditionRule::new(
                "Replica Mismatch",
                Rule::differ("deployment_replicas", "deployment_available_replicas"),
            ),
            ConditionRule::new(
                "Unavailable Pods",
                Rule::equals("deployment_available_replicas", 0.0),
            ),
            ConditionRule::new(
                "ImagePullFailure",
                Rule::mentions(&["ErrImagePull", "ImagePullBackOff"]),
            ),
            ConditionRule::new("CrashLoopBackOff", Rule::mentions(&["Back-off"])),
            ConditionRule::new("FailedScheduling", Rule::mentions(&["FailedScheduling"])),
            ConditionRule::new("QuotaExceeded", Rule::mentions(&["QuotaExceeded"])),
            ConditionRule::new(
                "ProgressDeadlineExceeded",
                Rule::mentions(&["ProgressDeadlineExceeded"]),
            ),
        ],
    }
}
