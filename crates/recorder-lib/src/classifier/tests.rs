//! Classifier scenarios for each resource kind

use super::*;
use crate::models::{InvolvedObject, ObjectKind};

fn snapshot(values: &[(&str, f64)]) -> MetricsSnapshot {
    values.iter().map(|(n, v)| (*n, Some(*v))).collect()
}

fn event(kind: ObjectKind, message: &str) -> ClusterEvent {
    ClusterEvent::new(
        format!("uid-{message}"),
        InvolvedObject {
            kind,
            namespace: Some("default".to_string()),
            name: "target".to_string(),
        },
        Some(message.to_string()),
    )
}

fn set(names: &[&str]) -> Detected {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_node_cpu_pressure_only() {
    let classifier = ErrorClassifier::node(&NodeThresholds::default());
    let metrics = snapshot(&[
        ("node_cpu_usage", 85.0),
        ("node_memory_usage", 50.0),
        ("node_disk_usage", 10.0),
        ("node_disk_pressure", 0.0),
    ]);

    assert_eq!(classifier.classify(&metrics, &[]), set(&["CPU Pressure"]));
}

#[test]
fn test_node_disk_pressure_from_any_source_appears_once() {
    let classifier = ErrorClassifier::node(&NodeThresholds::default());
    let metrics = snapshot(&[("node_disk_usage", 95.0), ("node_disk_pressure", 1.0)]);
    let disk = event(ObjectKind::Node, "Node worker-1 status is now: NodeHasDiskPressure");

    let detected = classifier.classify(&metrics, &[&disk]);
    assert_eq!(detected, set(&["Disk Pressure"]));
}

#[test]
fn test_node_event_markers() {
    let classifier = ErrorClassifier::node(&NodeThresholds::default());
    let events = [
        event(ObjectKind::Node, "Node worker-1 status is now: NodeNotReady"),
        event(ObjectKind::Node, "Node worker-1 status is now: NodeHasInsufficientMemory MemoryPressure"),
        event(ObjectKind::Node, "NetworkUnavailable condition set"),
        event(ObjectKind::Node, "PIDPressure on node"),
        event(ObjectKind::Node, "Taint node.kubernetes.io/unschedulable added"),
    ];
    let refs: Vec<&ClusterEvent> = events.iter().collect();

    let detected = classifier.classify(&MetricsSnapshot::new(), &refs);
    assert_eq!(
        detected,
        set(&[
            "Memory Pressure",
            "Network Unavailable",
            "Node Not Ready",
            "PID Pressure",
            "Node Unschedulable",
        ])
    );
}

#[test]
fn test_node_thresholds_are_configurable() {
    let classifier = ErrorClassifier::node(&NodeThresholds {
        cpu_usage: 50.0,
        ..NodeThresholds::default()
    });
    let metrics = snapshot(&[("node_cpu_usage", 60.0)]);
    assert_eq!(classifier.classify(&metrics, &[]), set(&["CPU Pressure"]));
}

#[test]
fn test_node_null_metrics_detect_nothing() {
    let classifier = ErrorClassifier::node(&NodeThresholds::default());
    let metrics: MetricsSnapshot = [
        ("node_cpu_usage", None),
        ("node_memory_usage", None),
        ("node_disk_usage", None),
        ("node_disk_pressure", None),
    ]
    .into_iter()
    .collect();

    assert!(classifier.classify(&metrics, &[]).is_empty());
}

#[test]
fn test_pod_image_pull_backoff_is_container_not_ready() {
    let classifier = ErrorClassifier::pod(&PodThresholds::default());
    let metrics = snapshot(&[("cpu_throttling", 0.2), ("cpu_usage", 10.0)]);
    let backoff = event(ObjectKind::Pod, "Back-off pulling image \"registry/app:v2\"");

    assert_eq!(
        classifier.classify(&metrics, &[&backoff]),
        set(&["ContainerNotReady"])
    );
}

#[test]
fn test_pod_crash_loop_and_metric_rules() {
    let classifier = ErrorClassifier::pod(&PodThresholds::default());
    let metrics = snapshot(&[("cpu_throttling", 0.9), ("cpu_usage", 95.0)]);
    let crash = event(ObjectKind::Pod, "Back-off restarting failed container app");
    let oom = event(ObjectKind::Pod, "Container app was OOMKilled");

    assert_eq!(
        classifier.classify(&metrics, &[&crash, &oom]),
        set(&[
            "CPU Throttling",
            "High CPU Usage",
            "CrashLoopBackOff",
            "OOMKilled (Out of Memory)",
        ])
    );
}

#[test]
fn test_pod_scheduling_pressure_and_pull_failures() {
    let classifier = ErrorClassifier::pod(&PodThresholds::default());
    let events = [
        event(ObjectKind::Pod, "FailedScheduling: 0/3 nodes are available"),
        event(ObjectKind::Pod, "The node had condition: [DiskPressure]"),
        event(ObjectKind::Pod, "Error: ErrImagePull"),
        event(ObjectKind::Pod, "ContainerCreating"),
    ];
    let refs: Vec<&ClusterEvent> = events.iter().collect();

    assert_eq!(
        classifier.classify(&MetricsSnapshot::new(), &refs),
        set(&[
            "PodUnschedulable",
            "NodePressure",
            "ImagePullFailure",
            "ContainerNotReady",
        ])
    );
}

#[test]
fn test_pod_markers_are_case_sensitive() {
    let classifier = ErrorClassifier::pod(&PodThresholds::default());
    let lower = event(ObjectKind::Pod, "oomkilled back-off errimagepull");
    assert!(classifier.classify(&MetricsSnapshot::new(), &[&lower]).is_empty());
}

#[test]
fn test_deployment_replica_mismatch_and_unavailable() {
    let classifier = ErrorClassifier::deployment();
    let metrics = snapshot(&[
        ("deployment_replicas", 3.0),
        ("deployment_available_replicas", 0.0),
    ]);

    assert_eq!(
        classifier.classify(&metrics, &[]),
        set(&["Replica Mismatch", "Unavailable Pods"])
    );
}

#[test]
fn test_deployment_null_replicas() {
    let classifier = ErrorClassifier::deployment();

    // Both missing: 0 == 0 and availability unknown
    let empty: MetricsSnapshot = [
        ("deployment_replicas", None),
        ("deployment_available_replicas", None),
    ]
    .into_iter()
    .collect();
    assert!(classifier.classify(&empty, &[]).is_empty());

    // Desired known, available missing
    let partial: MetricsSnapshot = [
        ("deployment_replicas", Some(2.0)),
        ("deployment_available_replicas", None),
    ]
    .into_iter()
    .collect();
    assert_eq!(classifier.classify(&partial, &[]), set(&["Replica Mismatch"]));
}

#[test]
fn test_deployment_event_markers() {
    let classifier = ErrorClassifier::deployment();
    let metrics = snapshot(&[
        ("deployment_replicas", 2.0),
        ("deployment_available_replicas", 2.0),
    ]);
    let events = [
        event(ObjectKind::Deployment, "exceeded quota: QuotaExceeded"),
        event(ObjectKind::Deployment, "ProgressDeadlineExceeded for rollout"),
        event(ObjectKind::Deployment, "ImagePullBackOff on replica"),
        event(ObjectKind::Deployment, "Back-off restarting failed container"),
        event(ObjectKind::Deployment, "FailedScheduling"),
    ];
    let refs: Vec<&ClusterEvent> = events.iter().collect();

    assert_eq!(
        classifier.classify(&metrics, &refs),
        set(&[
            "QuotaExceeded",
            "ProgressDeadlineExceeded",
            "ImagePullFailure",
            "CrashLoopBackOff",
            "FailedScheduling",
        ])
    );
}

#[test]
fn test_deployment_pull_backoff_counts_as_crash_loop() {
    let classifier = ErrorClassifier::deployment();
    let metrics = snapshot(&[
        ("deployment_replicas", 1.0),
        ("deployment_available_replicas", 1.0),
    ]);
    let events = [event(ObjectKind::Deployment, "Back-off pulling image \"x\"")];
    let refs: Vec<&ClusterEvent> = events.iter().collect();

    assert_eq!(
        classifier.classify(&metrics, &refs),
        set(&["CrashLoopBackOff"])
    );
}

#[test]
fn test_detected_is_subset_of_vocabulary() {
    let classifiers = [
        ErrorClassifier::node(&NodeThresholds::default()),
        ErrorClassifier::pod(&PodThresholds::default()),
        ErrorClassifier::deployment(),
    ];
    let noisy = event(
        ObjectKind::Pod,
        "OOMKilled Back-off ContainerCreating FailedScheduling MemoryPressure DiskPressure \
         ErrImagePull QuotaExceeded ProgressDeadlineExceeded NetworkUnavailable NodeNotReady \
         PIDPressure Taint",
    );
    let metrics = snapshot(&[
        ("node_cpu_usage", 100.0),
        ("node_memory_usage", 100.0),
        ("node_disk_usage", 100.0),
        ("cpu_throttling", 5.0),
        ("cpu_usage", 500.0),
        ("deployment_replicas", 1.0),
        ("deployment_available_replicas", 0.0),
    ]);

    for classifier in &classifiers {
        let detected = classifier.classify(&metrics, &[&noisy]);
        assert_eq!(detected.len(), classifier.vocabulary().len());
        let encoding = classifier.encode(&detected).unwrap();
        assert_eq!(encoding.active().len(), classifier.vocabulary().len());
    }
}

#[test]
fn test_encode_rejects_unknown_condition() {
    let classifier = ErrorClassifier::pod(&PodThresholds::default());
    let err = classifier.encode(&set(&["Replica Mismatch"])).unwrap_err();
    assert!(matches!(err, ClassifyError::UnknownCondition { kind: ResourceKind::Pod, .. }));
}

#[test]
fn test_profile_with_stray_rule_is_rejected() {
    let profile = ClassifierProfile {
        kind: ResourceKind::Node,
        vocabulary: vec!["A".to_string()],
        rules: vec![ConditionRule::new("B", Rule::mentions(&["b"]))],
    };
    assert!(ErrorClassifier::new(profile).is_err());
}

#[test]
fn test_custom_profile() {
    let profile = ClassifierProfile {
        kind: ResourceKind::Pod,
        vocabulary: vec!["Restarting".to_string(), "Quiet".to_string()],
        rules: vec![ConditionRule::new("Restarting", Rule::above("restarts", 3.0))],
    };
    let classifier = ErrorClassifier::new(profile).unwrap();
    let detected = classifier.classify(&snapshot(&[("restarts", 4.0)]), &[]);
    let encoding = classifier.encode(&detected).unwrap();

    assert_eq!(encoding.get("Restarting"), Some(1));
    assert_eq!(encoding.get("Quiet"), Some(0));
}
