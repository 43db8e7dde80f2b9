//! Detection rules

use crate::models::MetricsSnapshot;

/// A single detection rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Metric strictly above the threshold. A null metric never fires.
    Above { metric: String, threshold: f64 },
    /// Metric equal to a value. A null metric never fires.
    Equals { metric: String, value: f64 },
    /// Two metrics differ, with null read as zero.
    Differ { left: String, right: String },
    /// Some event text contains one of the markers after every `unless`
    /// phrase is removed from it. Case-sensitive.
    EventMentions {
        markers: Vec<String>,
        unless: Vec<String>,
    },
}

impl Rule {
    pub fn above(metric: &str, threshold: f64) -> Self {
        Rule::Above {
            metric: metric.to_string(),
            threshold,
        }
    }

    pub fn equals(metric: &str, value: f64) -> Self {
        Rule::Equals {
            metric: metric.to_string(),
            value,
        }
    }

    pub fn differ(left: &str, right: &str) -> Self {
        Rule::Differ {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn mentions(markers: &[&str]) -> Self {
        Rule::EventMentions {
            markers: markers.iter().map(|m| m.to_string()).collect(),
            unless: Vec::new(),
        }
    }

    /// Ignore occurrences that are part of `phrase`
    pub fn unless(self, phrase: &str) -> Self {
        match self {
            Rule::EventMentions {
                markers,
                mut unless,
            } => {
                unless.push(phrase.to_string());
                Rule::EventMentions { markers, unless }
            }
            other => other,
        }
    }

    pub(crate) fn fires(&self, metrics: &MetricsSnapshot, event_texts: &[String]) -> bool {
        match self {
            Rule::Above { metric, threshold } => {
                metrics.get(metric).map_or(false, |v| v > *threshold)
            }
            Rule::Equals { metric, value } => metrics
                .get(metric)
                .map_or(false, |v| (v - value).abs() < f64::EPSILON),
            Rule::Differ { left, right } => {
                let l = metrics.get(left).unwrap_or(0.0);
                let r = metrics.get(right).unwrap_or(0.0);
                (l - r).abs() >= f64::EPSILON
            }
            Rule::EventMentions { markers, unless } => event_texts.iter().any(|text| {
                let text = unless
                    .iter()
                    .fold(text.clone(), |acc, phrase| acc.replace(phrase.as_str(), ""));
                markers.iter().any(|m| text.contains(m.as_str()))
            }),
        }
    }
}

/// Rule attached to the condition it detects
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRule {
    pub condition: String,
    pub rule: Rule,
}

impl ConditionRule {
    pub fn new(condition: &str, rule: Rule) -> Self {
        Self {
            condition: condition.to_string(),
            rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(values: &[(&str, Option<f64>)]) -> MetricsSnapshot {
        values.iter().map(|(n, v)| (*n, *v)).collect()
    }

    #[test]
    fn test_above_is_strict_and_ignores_null() {
        let rule = Rule::above("cpu", 80.0);
        assert!(rule.fires(&snapshot(&[("cpu", Some(80.5))]), &[]));
        assert!(!rule.fires(&snapshot(&[("cpu", Some(80.0))]), &[]));
        assert!(!rule.fires(&snapshot(&[("cpu", None)]), &[]));
        assert!(!rule.fires(&MetricsSnapshot::new(), &[]));
    }

    #[test]
    fn test_differ_reads_null_as_zero() {
        let rule = Rule::differ("want", "have");
        assert!(rule.fires(&snapshot(&[("want", Some(3.0)), ("have", None)]), &[]));
        assert!(!rule.fires(&snapshot(&[("want", None), ("have", None)]), &[]));
        assert!(!rule.fires(&snapshot(&[("want", Some(0.0)), ("have", None)]), &[]));
        assert!(!rule.fires(&snapshot(&[("want", Some(2.0)), ("have", Some(2.0))]), &[]));
    }

    #[test]
    fn test_mentions_with_exclusion() {
        let rule = Rule::mentions(&["Back-off"]).unless("Back-off pulling image");
        let none = MetricsSnapshot::new();

        assert!(rule.fires(&none, &["Back-off restarting failed container".into()]));
        assert!(!rule.fires(&none, &["Back-off pulling image \"nginx:bad\"".into()]));
        assert!(rule.fires(
            &none,
            &["Back-off pulling image x; Back-off restarting failed container".into()]
        ));
        assert!(!rule.fires(&none, &["back-off restarting".into()]));
    }
}
