//! Query templating
//!
//! Templates are split around their placeholder once, at construction.
//! Rendering joins the pieces with the escaped resource name, so a name that
//! itself contains a placeholder token is never expanded again.

use crate::models::ResourceKind;
use std::fmt;

/// Placeholder token substituted with a resource name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Pod,
    Node,
    Deployment,
}

impl Placeholder {
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Pod => "{pod}",
            Placeholder::Node => "{node}",
            Placeholder::Deployment => "{deployment}",
        }
    }
}

impl From<ResourceKind> for Placeholder {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Pod => Placeholder::Pod,
            ResourceKind::Node => Placeholder::Node,
            ResourceKind::Deployment => Placeholder::Deployment,
        }
    }
}

/// A PromQL query with zero or more occurrences of one placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    placeholder: Placeholder,
    segments: Vec<String>,
}

impl QueryTemplate {
    pub fn new(template: &str, placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            segments: template
                .split(placeholder.token())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Number of placeholder occurrences
    pub fn arity(&self) -> usize {
        self.segments.len() - 1
    }

    /// Render with `name` as the placeholder value
    pub fn render(&self, name: &str) -> String {
        let value = escape_label_value(name);
        self.segments.join(&value)
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(self.placeholder.token()))
    }
}

/// Escape a value for use inside a double-quoted PromQL string
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}
