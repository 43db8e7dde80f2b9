//! Row persistence
//!
//! This module provides:
//! - Table schemas with a stable column order
//! - Loosely typed rows keyed by column name
//! - CSV and SQLite sinks behind the `RowSink` trait

mod csv_file;
mod schema;
mod sqlite;

pub use csv_file::CsvSink;
pub use schema::{columns, ColumnType, TableSchema, TableSchemaBuilder};
pub use sqlite::SqliteSink;

use crate::error::SinkError;
use std::collections::HashMap;
use std::fmt;

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Null, Value::Float)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Column values for one output row. Columns left unset are written as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Destination for output rows
pub trait RowSink: Send {
    /// Append `rows` to the table described by `schema`, creating it on
    /// first use. Returns the number of rows written.
    fn append_rows(&mut self, schema: &TableSchema, rows: &[Row]) -> Result<usize, SinkError>;

    /// Where this sink writes, for logging
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(1).to_string(), "1");
        assert_eq!(Value::Float(85.5).to_string(), "85.5");
        assert_eq!(Value::Float(0.0).to_string(), "0");
        assert_eq!(Value::from("api/web").to_string(), "api/web");
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some(2.5)), Value::Float(2.5));
        assert_eq!(Value::from(1u8), Value::Int(1));
    }

    #[test]
    fn test_row_set_replaces() {
        let mut row = Row::new();
        row.set("cpu_usage", Some(10.0));
        row.set("cpu_usage", Some(20.0));
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("cpu_usage"), Some(&Value::Float(20.0)));
        assert_eq!(row.get("missing"), None);
    }
}
