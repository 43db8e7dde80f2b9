//! Matching events to the resource they describe
//!
//! Matching is exact and case-sensitive on kind, name and namespace. Any
//! looser association (e.g. pods to their deployment) happens in the cycle.

use crate::models::{ClusterEvent, ObjectKind};

fn matching<'a>(
    events: &'a [ClusterEvent],
    kind: ObjectKind,
    namespace: Option<&str>,
    name: &str,
) -> Vec<&'a ClusterEvent> {
    events
        .iter()
        .filter(|event| {
            let obj = &event.involved_object;
            obj.kind == kind
                && obj.name == name
                && namespace.map_or(true, |ns| obj.namespace.as_deref() == Some(ns))
        })
        .collect()
}

/// Events whose involved object is the node `node_name`
pub fn for_node<'a>(events: &'a [ClusterEvent], node_name: &str) -> Vec<&'a ClusterEvent> {
    matching(events, ObjectKind::Node, None, node_name)
}

/// Events whose involved object is the pod `namespace/pod_name`
pub fn for_pod<'a>(
    events: &'a [ClusterEvent],
    namespace: &str,
    pod_name: &str,
) -> Vec<&'a ClusterEvent> {
    matching(events, ObjectKind::Pod, Some(namespace), pod_name)
}

/// Events whose involved object is the deployment `namespace/deployment_name`
pub fn for_deployment<'a>(
    events: &'a [ClusterEvent],
    namespace: &str,
    deployment_name: &str,
) -> Vec<&'a ClusterEvent> {
    matching(events, ObjectKind::Deployment, Some(namespace), deployment_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvolvedObject;

    fn event(uid: &str, kind: ObjectKind, namespace: Option<&str>, name: &str) -> ClusterEvent {
        ClusterEvent::new(
            uid,
            InvolvedObject {
                kind,
                namespace: namespace.map(str::to_string),
                name: name.to_string(),
            },
            None,
        )
    }

    fn sample() -> Vec<ClusterEvent> {
        vec![
            event("n1", ObjectKind::Node, None, "worker-1"),
            event("n2", ObjectKind::Node, None, "worker-2"),
            event("p1", ObjectKind::Pod, Some("default"), "api"),
            event("p2", ObjectKind::Pod, Some("staging"), "api"),
            event("d1", ObjectKind::Deployment, Some("default"), "api"),
            event("r1", ObjectKind::Other("ReplicaSet".into()), Some("default"), "api"),
            event("x1", ObjectKind::Pod, Some("default"), "api-7c9f"),
        ]
    }

    fn uids(events: &[&ClusterEvent]) -> Vec<String> {
        events.iter().map(|e| e.uid.clone()).collect()
    }

    #[test]
    fn test_for_node() {
        let events = sample();
        assert_eq!(uids(&for_node(&events, "worker-1")), vec!["n1"]);
        assert!(for_node(&events, "worker-3").is_empty());
    }

    #[test]
    fn test_for_pod_requires_namespace_match() {
        let events = sample();
        assert_eq!(uids(&for_pod(&events, "default", "api")), vec!["p1"]);
        assert_eq!(uids(&for_pod(&events, "staging", "api")), vec!["p2"]);
        assert!(for_pod(&events, "prod", "api").is_empty());
    }

    #[test]
    fn test_for_deployment() {
        let events = sample();
        assert_eq!(uids(&for_deployment(&events, "default", "api")), vec!["d1"]);
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        let events = sample();
        // Same namespace and name exist as Pod, Deployment and ReplicaSet
        for matched in for_pod(&events, "default", "api") {
            assert_eq!(matched.involved_object.kind, ObjectKind::Pod);
        }
        for matched in for_deployment(&events, "default", "api") {
            assert_eq!(matched.involved_object.kind, ObjectKind::Deployment);
        }
        assert!(for_node(&events, "api").is_empty());
    }

    #[test]
    fn test_no_prefix_or_case_folding() {
        let events = sample();
        assert!(for_deployment(&events, "default", "ap").is_empty());
        assert!(for_pod(&events, "default", "API").is_empty());
        assert!(for_node(&events, "Worker-1").is_empty());
    }
}
