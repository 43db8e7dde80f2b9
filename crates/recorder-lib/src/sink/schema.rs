//! Output table layouts

use crate::error::SinkError;
use crate::models::ResourceKind;
use crate::sink::{Row, Value};
use std::collections::HashSet;

/// Identity column names
pub mod columns {
    pub const TIMESTAMP: &str = "timestamp";
    pub const NAMESPACE: &str = "namespace";
    pub const POD: &str = "pod";
    pub const NODE: &str = "node";
    pub const DEPLOYMENT: &str = "deployment";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Real,
    Integer,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Integer => "INTEGER",
        }
    }
}

/// Name and ordered columns of one output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    kind: ResourceKind,
    name: String,
    columns: Vec<(String, ColumnType)>,
}

impl TableSchema {
    pub fn builder(kind: ResourceKind, name: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            schema: TableSchema {
                kind,
                name: name.into(),
                columns: Vec::new(),
            },
        }
    }

    /// `timestamp, node`, node metrics, node flags
    pub fn nodes(metrics: &[&str], flags: &[String]) -> Result<Self, SinkError> {
        Self::builder(ResourceKind::Node, "nodes")
            .text(columns::TIMESTAMP)
            .text(columns::NODE)
            .reals(metrics.iter().copied())
            .integers(flags.iter().map(String::as_str))
            .build()
    }

    /// `timestamp, namespace, deployment`, deployment metrics, deployment flags
    pub fn deployments(metrics: &[&str], flags: &[String]) -> Result<Self, SinkError> {
        Self::builder(ResourceKind::Deployment, "deployments")
            .text(columns::TIMESTAMP)
            .text(columns::NAMESPACE)
            .text(columns::DEPLOYMENT)
            .reals(metrics.iter().copied())
            .integers(flags.iter().map(String::as_str))
            .build()
    }

    /// Merged pod rows: pod identity and data, then the pod's node, then the
    /// owning deployment with its flags already prefixed
    pub fn pods(
        pod: (&[&str], &[String]),
        node: (&[&str], &[String]),
        deployment: (&[&str], &[String]),
    ) -> Result<Self, SinkError> {
        Self::builder(ResourceKind::Pod, "pods")
            .text(columns::TIMESTAMP)
            .text(columns::NAMESPACE)
            .text(columns::POD)
            .text(columns::NODE)
            .text(columns::DEPLOYMENT)
            .reals(pod.0.iter().copied())
            .integers(pod.1.iter().map(String::as_str))
            .reals(node.0.iter().copied())
            .integers(node.1.iter().map(String::as_str))
            .reals(deployment.0.iter().copied())
            .integers(deployment.1.iter().map(String::as_str))
            .build()
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[(String, ColumnType)] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Lay out `row` in column order, null-filling unset columns.
    ///
    /// A row column the schema does not declare is schema drift.
    pub fn project<'r>(&self, row: &'r Row) -> Result<Vec<&'r Value>, SinkError> {
        if let Some(unknown) = row
            .columns()
            .find(|c| !self.columns.iter().any(|(name, _)| name == c))
        {
            return Err(SinkError::UnknownColumn {
                table: self.name.clone(),
                column: unknown.to_string(),
            });
        }

        Ok(self
            .columns
            .iter()
            .map(|(name, _)| row.get(name).unwrap_or(&Value::Null))
            .collect())
    }
}

pub struct TableSchemaBuilder {
    schema: TableSchema,
}

impl TableSchemaBuilder {
    pub fn column(mut self, name: &str, ty: ColumnType) -> Self {
        self.schema.columns.push((name.to_string(), ty));
        self
    }

    pub fn text(self, name: &str) -> Self {
        self.column(name, ColumnType::Text)
    }

    pub fn reals<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .fold(self, |b, name| b.column(name, ColumnType::Real))
    }

    pub fn integers<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .fold(self, |b, name| b.column(name, ColumnType::Integer))
    }

    pub fn build(self) -> Result<TableSchema, SinkError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.schema.columns {
            if !seen.insert(name.as_str()) {
                return Err(SinkError::DuplicateColumn {
                    table: self.schema.name.clone(),
                    column: name.clone(),
                });
            }
        }
        Ok(self.schema)
    }
}
