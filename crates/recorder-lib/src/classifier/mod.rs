//! Error classification for nodes, pods and deployments
//!
//! A single [`ErrorClassifier`] is parameterized by a [`ClassifierProfile`]
//! holding the kind's fixed vocabulary of condition names and the rules that
//! detect them. The three built-in profiles are created from [`Thresholds`].

mod encoder;
mod profiles;
mod rules;

#[cfg(test)]
mod tests;

pub use encoder::{encode, FlagEncoding};
pub use profiles::{
    NodeThresholds, PodThresholds, Thresholds, DEPLOYMENT_CONDITIONS, DEPLOYMENT_FLAG_PREFIX,
    NODE_CONDITIONS, POD_CONDITIONS,
};
pub use rules::{ConditionRule, Rule};

use crate::error::ClassifyError;
use crate::models::{ClusterEvent, MetricsSnapshot, ResourceKind};
use std::collections::BTreeSet;

/// Set of condition names detected for one resource
pub type Detected = BTreeSet<String>;

/// Vocabulary and detection rules for one resource kind
#[derive(Debug, Clone)]
pub struct ClassifierProfile {
    pub kind: ResourceKind,
    /// Ordered condition names; every encoding covers exactly these
    pub vocabulary: Vec<String>,
    pub rules: Vec<ConditionRule>,
}

/// Maps a metrics snapshot plus correlated events to detected conditions
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    profile: ClassifierProfile,
}

impl ErrorClassifier {
    /// Create a classifier, rejecting rules that name conditions outside
    /// the vocabulary
    pub fn new(profile: ClassifierProfile) -> Result<Self, ClassifyError> {
        if let Some(stray) = profile
            .rules
            .iter()
            .find(|r| !profile.vocabulary.iter().any(|v| *v == r.condition))
        {
            return Err(ClassifyError::UnknownCondition {
                kind: profile.kind,
                name: stray.condition.clone(),
            });
        }
        Ok(Self { profile })
    }

    pub fn node(thresholds: &NodeThresholds) -> Self {
        Self {
            profile: profiles::node_profile(thresholds),
        }
    }

    pub fn pod(thresholds: &PodThresholds) -> Self {
        Self {
            profile: profiles::pod_profile(thresholds),
        }
    }

    pub fn deployment() -> Self {
        Self {
            profile: profiles::deployment_profile(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.profile.kind
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.profile.vocabulary
    }

    /// Conditions currently true for the resource
    pub fn classify(&self, metrics: &MetricsSnapshot, events: &[&ClusterEvent]) -> Detected {
        let texts: Vec<String> = events.iter().map(|e| e.text()).collect();

        self.profile
            .rules
            .iter()
            .filter(|rule| rule.rule.fires(metrics, &texts))
            .map(|rule| rule.condition.clone())
            .collect()
    }

    /// Encode a detected set against this classifier's vocabulary
    ///
    /// A name outside the vocabulary means the rules and the vocabulary
    /// drifted apart and is reported as an error.
    pub fn encode(&self, detected: &Detected) -> Result<FlagEncoding, ClassifyError> {
        if let Some(stray) = detected
            .iter()
            .find(|name| !self.profile.vocabulary.contains(name))
        {
            return Err(ClassifyError::UnknownCondition {
                kind: self.profile.kind,
                name: stray.clone(),
            });
        }
        Ok(encode(&self.profile.vocabulary, detected))
    }
}
