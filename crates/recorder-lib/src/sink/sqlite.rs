use super::{Row, RowSink, TableSchema, Value};
use crate::error::SinkError;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Writes each table into one SQLite database
pub struct SqliteSink {
    conn: Connection,
    location: String,
    ready: HashSet<String>,
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Int(v) => rusqlite::types::Value::Integer(*v),
        Value::Float(v) => rusqlite::types::Value::Real(*v),
        Value::Text(v) => rusqlite::types::Value::Text(v.clone()),
    }
}

impl SqliteSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!(path = %path.display(), "Opened SQLite output");
        Ok(Self {
            conn,
            location: path.display().to_string(),
            ready: HashSet::new(),
        })
    }

    pub fn in_memory() -> Result<Self, SinkError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            location: ":memory:".to_string(),
            ready: HashSet::new(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the table if missing and verify an existing one matches
    fn ensure_table(&mut self, schema: &TableSchema) -> Result<(), SinkError> {
        if self.ready.contains(schema.name()) {
            return Ok(());
        }

        let columns = schema
            .columns()
            .iter()
            .map(|(name, ty)| format!("{} {}", quote(name), ty.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote(schema.name()),
            columns
        ))?;

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote(schema.name())))?;
        let existing = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        if !existing.iter().map(String::as_str).eq(schema.column_names()) {
            return Err(SinkError::HeaderMismatch {
                table: schema.name().to_string(),
            });
        }

        self.ready.insert(schema.name().to_string());
        Ok(())
    }
}

impl RowSink for SqliteSink {
    fn append_rows(&mut self, schema: &TableSchema, rows: &[Row]) -> Result<usize, SinkError> {
        let projected = rows
            .iter()
            .map(|row| schema.project(row))
            .collect::<Result<Vec<_>, _>>()?;
        self.ensure_table(schema)?;
        if projected.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(schema.name()),
            schema.column_names().map(quote).collect::<Vec<_>>().join(", "),
            vec!["?"; schema.len()].join(", ")
        );

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for values in &projected {
                stmt.execute(params_from_iter(values.iter().copied().map(to_sql)))?;
            }
        }
        tx.commit()?;

        debug!(
            table = schema.name(),
            rows = projected.len(),
            "Inserted SQLite rows"
        );
        Ok(projected.len())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn schema() -> TableSchema {
        TableSchema::deployments(
            &["deployment_replicas"],
            &["Replica Mismatch".to_string()],
        )
        .unwrap()
    }

    fn row(name: &str, replicas: Option<f64>, mismatch: u8) -> Row {
        let mut row = Row::new();
        row.set("timestamp", "2024-01-01T00:00:00Z");
        row.set("namespace", "shop");
        row.set("deployment", name);
        row.set("deployment_replicas", replicas);
        row.set("Replica Mismatch", mismatch);
        row
    }

    #[test]
    fn test_insert_and_read_back() {
        let mut sink = SqliteSink::in_memory().unwrap();
        let schema = schema();

        assert_eq!(sink.append_rows(&schema, &[row("web", Some(3.0), 1)]).unwrap(), 1);
        assert_eq!(sink.append_rows(&schema, &[row("api", None, 0)]).unwrap(), 1);

        let conn = sink.connection();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM deployments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let (replicas, flag): (Option<f64>, i64) = conn
            .query_row(
                "SELECT deployment_replicas, \"Replica Mismatch\" FROM deployments WHERE deployment = 'api'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(replicas, None);
        assert_eq!(flag, 0);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("k8s_metrics.db");
        let schema = schema();

        {
            let mut sink = SqliteSink::open(&path).unwrap();
            sink.append_rows(&schema, &[row("web", Some(1.0), 0)]).unwrap();
        }
        let mut sink = SqliteSink::open(&path).unwrap();
        sink.append_rows(&schema, &[row("web", Some(1.0), 0)]).unwrap();

        let count: i64 = sink
            .connection()
            .query_row("SELECT COUNT(*) FROM deployments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_existing_table_with_other_layout() {
        let sink_schema = schema();
        let mut sink = SqliteSink::in_memory().unwrap();
        sink.connection()
            .execute_batch("CREATE TABLE deployments (timestamp TEXT, deployment TEXT);")
            .unwrap();

        let err = sink
            .append_rows(&sink_schema, &[row("web", None, 0)])
            .unwrap_err();
        assert!(matches!(err, SinkError::HeaderMismatch { .. }));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote("CPU Pressure"), "\"CPU Pressure\"");
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }
}
