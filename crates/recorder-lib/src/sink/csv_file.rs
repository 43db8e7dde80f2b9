use super::{Row, RowSink, TableSchema};
use crate::error::SinkError;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes one CSV file per table under a directory
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// `k8s_<kind>_metrics.csv`
    pub fn path_for(&self, schema: &TableSchema) -> PathBuf {
        self.dir.join(format!("k8s_{}_metrics.csv", schema.kind()))
    }
}

/// Existing header of a non-empty file, `None` if the file is new or empty
fn existing_header(path: &Path) -> Result<Option<Vec<String>>, SinkError> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let header = match reader.records().next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Ok(None),
    };
    Ok(Some(header))
}

impl RowSink for CsvSink {
    fn append_rows(&mut self, schema: &TableSchema, rows: &[Row]) -> Result<usize, SinkError> {
        let projected = rows
            .iter()
            .map(|row| schema.project(row))
            .collect::<Result<Vec<_>, _>>()?;
        if projected.is_empty() {
            return Ok(0);
        }

        let path = self.path_for(schema);
        let write_header = match existing_header(&path)? {
            Some(header) => {
                if !header.iter().map(String::as_str).eq(schema.column_names()) {
                    return Err(SinkError::HeaderMismatch {
                        table: schema.name().to_string(),
                    });
                }
                false
            }
            None => true,
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(schema.column_names())?;
        }
        for values in &projected {
            writer.write_record(values.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;

        debug!(
            table = schema.name(),
            path = %path.display(),
            rows = projected.len(),
            "Appended CSV rows"
        );
        Ok(projected.len())
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.dir.display())
    }
}
