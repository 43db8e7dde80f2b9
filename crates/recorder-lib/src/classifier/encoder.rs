//! Binary flag encoding of detected conditions

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Total mapping from every vocabulary name to 0 or 1, in vocabulary order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagEncoding {
    flags: Vec<(String, u8)>,
}

/// Encode `detected` against `vocabulary`
///
/// Every vocabulary name appears exactly once in the output; names in
/// `detected` that are not in the vocabulary are ignored here. Callers that
/// must reject them go through [`super::ErrorClassifier::encode`].
pub fn encode(vocabulary: &[String], detected: &BTreeSet<String>) -> FlagEncoding {
    FlagEncoding {
        flags: vocabulary
            .iter()
            .map(|name| (name.clone(), u8::from(detected.contains(name))))
            .collect(),
    }
}

impl FlagEncoding {
    /// Same flags with every key prefixed
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            flags: self
                .flags
                .iter()
                .map(|(name, flag)| (format!("{prefix}{name}"), *flag))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.flags.iter().find(|(n, _)| n == name).map(|(_, f)| *f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.flags.iter().map(|(n, f)| (n.as_str(), *f))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|(n, _)| n.as_str())
    }

    /// Names whose flag is set
    pub fn active(&self) -> Vec<&str> {
        self.iter().filter(|(_, f)| *f == 1).map(|(n, _)| n).collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl Serialize for FlagEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.flags.iter().map(|(n, f)| (n, f)))
    }
}
