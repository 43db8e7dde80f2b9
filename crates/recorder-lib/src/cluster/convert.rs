//! Conversions from Kubernetes API objects to recorder models

use crate::models::{ClusterEvent, DeploymentRef, InvolvedObject, ObjectKind, PodRef};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Node, Pod};

const POD_TEMPLATE_HASH_LABEL: &str = "pod-template-hash";

/// Events without a uid are keyed by their own `namespace/name`
pub fn event_from(event: &Event) -> ClusterEvent {
    let meta = &event.metadata;
    let uid = meta.uid.clone().unwrap_or_else(|| {
        format!(
            "{}/{}",
            meta.namespace.as_deref().unwrap_or_default(),
            meta.name.as_deref().unwrap_or_default()
        )
    });

    let involved = &event.involved_object;
    let involved_object = InvolvedObject {
        kind: ObjectKind::parse(involved.kind.as_deref().unwrap_or_default()),
        namespace: involved.namespace.clone(),
        name: involved.name.clone().unwrap_or_default(),
    };

    ClusterEvent::new(uid, involved_object, event.message.clone())
}

/// `None` for a pod without a name
pub fn pod_ref(pod: &Pod) -> Option<PodRef> {
    let meta = &pod.metadata;
    let name = meta.name.clone()?;
    let node = pod.spec.as_ref().and_then(|s| s.node_name.clone());

    let mut pod_ref = PodRef::new(meta.namespace.clone().unwrap_or_default(), name, node);
    pod_ref.replica_set = meta.owner_references.as_ref().and_then(|owners| {
        owners
            .iter()
            .find(|o| o.controller == Some(true) && o.kind == "ReplicaSet")
            .map(|o| o.name.clone())
    });
    pod_ref.pod_template_hash = meta
        .labels
        .as_ref()
        .and_then(|labels| labels.get(POD_TEMPLATE_HASH_LABEL).cloned());

    Some(pod_ref)
}

pub fn node_name(node: &Node) -> Option<String> {
    node.metadata.name.clone()
}

pub fn deployment_ref(deployment: &Deployment) -> Option<DeploymentRef> {
    let meta = &deployment.metadata;
    Some(DeploymentRef::new(
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ObjectReference, PodSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
    use std::collections::BTreeMap;

    fn meta(namespace: &str, name: &str) -> ObjectMeta {
        ObjectMeta {
            namespace: Some(namespace.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_conversion() {
        let event = Event {
            metadata: ObjectMeta {
                uid: Some("u-1".to_string()),
                ..meta("shop", "web-1.17a")
            },
            involved_object: ObjectReference {
                kind: Some("Pod".to_string()),
                namespace: Some("shop".to_string()),
                name: Some("web-1".to_string()),
                ..Default::default()
            },
            message: Some("Back-off restarting failed container".to_string()),
            ..Default::default()
        };

        let converted = event_from(&event);
        assert_eq!(converted.uid, "u-1");
        assert_eq!(converted.involved_object.kind, ObjectKind::Pod);
        assert_eq!(converted.involved_object.namespace.as_deref(), Some("shop"));
        assert_eq!(converted.involved_object.name, "web-1");
        assert_eq!(converted.text(), "Back-off restarting failed container");
    }

    #[test]
    fn test_event_without_uid_uses_object_name() {
        let event = Event {
            metadata: meta("kube-system", "node-a.17b"),
            involved_object: ObjectReference {
                kind: Some("Node".to_string()),
                name: Some("node-a".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let converted = event_from(&event);
        assert_eq!(converted.uid, "kube-system/node-a.17b");
        assert_eq!(converted.involved_object.namespace, None);
        assert!(converted.message_fragments.is_empty());
        assert_eq!(converted.text(), "");
    }

    #[test]
    fn test_event_unknown_kind() {
        let event = Event {
            involved_object: ObjectReference {
                kind: Some("ReplicaSet".to_string()),
                name: Some("web-5d8f".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            event_from(&event).involved_object.kind,
            ObjectKind::Other("ReplicaSet".to_string())
        );
    }

    #[test]
    fn test_pod_conversion_with_owner() {
        let pod = Pod {
            metadata: ObjectMeta {
                labels: Some(BTreeMap::from([(
                    "pod-template-hash".to_string(),
                    "5d8f7c".to_string(),
                )])),
                owner_references: Some(vec![OwnerReference {
                    api_version: "apps/v1".to_string(),
                    kind: "ReplicaSet".to_string(),
                    name: "web-5d8f7c".to_string(),
                    uid: "rs-1".to_string(),
                    controller: Some(true),
                    ..Default::default()
                }]),
                ..meta("shop", "web-5d8f7c-abcde")
            },
            spec: Some(PodSpec {
                node_name: Some("worker-1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let converted = pod_ref(&pod).unwrap();
        assert_eq!(converted.namespace, "shop");
        assert_eq!(converted.name, "web-5d8f7c-abcde");
        assert_eq!(converted.node.as_deref(), Some("worker-1"));
        assert_eq!(converted.replica_set.as_deref(), Some("web-5d8f7c"));
        assert_eq!(converted.pod_template_hash.as_deref(), Some("5d8f7c"));
    }

    #[test]
    fn test_unscheduled_pod_has_no_node() {
        let pod = Pod {
            metadata: meta("shop", "pending-1"),
            ..Default::default()
        };
        let converted = pod_ref(&pod).unwrap();
        assert_eq!(converted.node, None);
        assert_eq!(converted.replica_set, None);
    }

    #[test]
    fn test_nameless_objects_are_skipped() {
        assert!(pod_ref(&Pod::default()).is_none());
        assert!(node_name(&Node::default()).is_none());
        assert!(deployment_ref(&Deployment::default()).is_none());
    }

    #[test]
    fn test_deployment_conversion() {
        let deployment = Deployment {
            metadata: meta("shop", "web"),
            ..Default::default()
        };
        assert_eq!(
            deployment_ref(&deployment),
            Some(DeploymentRef::new("shop", "web"))
        );
    }
}
