use crate::models::{DeploymentRef, PodRef};
use serde::{Deserialize, Serialize};

/// How a pod is associated with its owning deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerResolution {
    /// First deployment in listing order, in the pod's namespace, whose name
    /// is a prefix of the pod name. Ambiguous for deployments sharing a
    /// prefix such as `api` and `api-v2`; kept as the default so existing
    /// datasets stay comparable.
    #[default]
    NamePrefix,
    /// The pod's controlling ReplicaSet name without its
    /// `-<pod-template-hash>` suffix must equal the deployment name.
    ReplicaSet,
}

impl OwnerResolution {
    pub fn resolve<'a>(
        &self,
        pod: &PodRef,
        deployments: &'a [DeploymentRef],
    ) -> Option<&'a DeploymentRef> {
        match self {
            OwnerResolution::NamePrefix => deployments
                .iter()
                .find(|d| d.namespace == pod.namespace && pod.name.starts_with(&d.name)),
            OwnerResolution::ReplicaSet => {
                let owner = replica_set_owner(pod)?;
                deployments
                    .iter()
                    .find(|d| d.namespace == pod.namespace && d.name == owner)
            }
        }
    }
}

fn replica_set_owner(pod: &PodRef) -> Option<&str> {
    let replica_set = pod.replica_set.as_deref()?;
    match pod.pod_template_hash.as_deref() {
        Some(hash) => replica_set.strip_suffix(hash)?.strip_suffix('-'),
        None => replica_set.rsplit_once('-').map(|(owner, _)| owner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployments() -> Vec<DeploymentRef> {
        vec![
            DeploymentRef::new("shop", "api"),
            DeploymentRef::new("shop", "api-v2"),
            DeploymentRef::new("billing", "worker"),
        ]
    }

    fn owned_pod(name: &str, replica_set: &str, hash: &str) -> PodRef {
        let mut pod = PodRef::new("shop", name, None);
        pod.replica_set = Some(replica_set.to_string());
        pod.pod_template_hash = Some(hash.to_string());
        pod
    }

    #[test]
    fn test_name_prefix_takes_first_match() {
        let deployments = deployments();
        let pod = PodRef::new("shop", "api-v2-7d9c-x1", None);
        let owner = OwnerResolution::NamePrefix.resolve(&pod, &deployments);
        assert_eq!(owner.map(|d| d.name.as_str()), Some("api"));
    }

    #[test]
    fn test_name_prefix_respects_namespace() {
        let deployments = deployments();
        let pod = PodRef::new("shop", "worker-abc", None);
        assert_eq!(OwnerResolution::NamePrefix.resolve(&pod, &deployments), None);
    }

    #[test]
    fn test_replica_set_exact_owner() {
        let deployments = deployments();
        let pod = owned_pod("api-v2-7d9c-x1", "api-v2-7d9c", "7d9c");
        let owner = OwnerResolution::ReplicaSet.resolve(&pod, &deployments);
        assert_eq!(owner.map(|d| d.name.as_str()), Some("api-v2"));
    }

    #[test]
    fn test_replica_set_without_hash_label() {
        let deployments = deployments();
        let mut pod = PodRef::new("shop", "api-5f6b-q", None);
        pod.replica_set = Some("api-5f6b".to_string());
        let owner = OwnerResolution::ReplicaSet.resolve(&pod, &deployments);
        assert_eq!(owner.map(|d| d.name.as_str()), Some("api"));
    }

    #[test]
    fn test_replica_set_requires_owner() {
        let deployments = deployments();
        let pod = PodRef::new("shop", "api-standalone", None);
        assert_eq!(OwnerResolution::ReplicaSet.resolve(&pod, &deployments), None);

        let mismatched = owned_pod("api-x", "api-1234", "9999");
        assert_eq!(OwnerResolution::ReplicaSet.resolve(&mismatched, &deployments), None);
    }

    #[test]
    fn test_deserialize_names() {
        let parsed: OwnerResolution = serde_json::from_str("\"replica_set\"").unwrap();
        assert_eq!(parsed, OwnerResolution::ReplicaSet);
        let parsed: OwnerResolution = serde_json::from_str("\"name_prefix\"").unwrap();
        assert_eq!(parsed, OwnerResolution::NamePrefix);
    }
}
