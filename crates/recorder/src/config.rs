//! Recorder configuration
//!
//! Values come from an optional file overlaid by `RECORDER_*` environment
//! variables. Nested keys use `__`, e.g. `RECORDER_THRESHOLDS__NODE__CPU_USAGE`.

use anyhow::{Context, Result};
use recorder_lib::classifier::Thresholds;
use recorder_lib::cycle::OwnerResolution;
use recorder_lib::sink::{CsvSink, RowSink, SqliteSink};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "RECORDER";

/// Output backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// One `k8s_<kind>_metrics.csv` per table
    #[default]
    Csv,
    /// One database with a table per resource kind
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    /// Kubeconfig context; the current context when unset
    #[serde(default)]
    pub kube_context: Option<String>,

    #[serde(default = "default_prometheus_url")]
    pub prometheus_url: String,

    #[serde(default = "default_prometheus_timeout")]
    pub prometheus_timeout_secs: u64,

    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub sink: SinkKind,

    /// Database file name, relative to `output_dir`
    #[serde(default = "default_sqlite_file")]
    pub sqlite_file: String,

    /// Health and metrics port; 0 disables the server
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default)]
    pub owner_resolution: OwnerResolution,

    #[serde(default)]
    pub thresholds: Thresholds,
}

fn default_prometheus_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_prometheus_timeout() -> u64 {
    10
}

fn default_polling_interval() -> u64 {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_sqlite_file() -> String {
    "k8s_metrics.db".to_string()
}

fn default_api_port() -> u16 {
    8080
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            kube_context: None,
            prometheus_url: default_prometheus_url(),
            prometheus_timeout_secs: default_prometheus_timeout(),
            polling_interval_secs: default_polling_interval(),
            output_dir: default_output_dir(),
            sink: SinkKind::default(),
            sqlite_file: default_sqlite_file(),
            api_port: default_api_port(),
            owner_resolution: OwnerResolution::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl RecorderConfig {
    /// Load from `file` (format from its extension) and the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_sources(file, None)
    }

    /// Load with an explicit environment map instead of the process one
    pub fn from_sources(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.polling_interval_secs == 0 {
            anyhow::bail!("polling_interval_secs must be greater than zero");
        }
        if self.prometheus_timeout_secs == 0 {
            anyhow::bail!("prometheus_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs)
    }

    pub fn prometheus_timeout(&self) -> Duration {
        Duration::from_secs(self.prometheus_timeout_secs)
    }

    /// Name used in log events for the cluster being recorded
    pub fn cluster_label(&self) -> &str {
        self.kube_context.as_deref().unwrap_or("default")
    }

    pub fn open_sink(&self) -> Result<Box<dyn RowSink>> {
        let sink: Box<dyn RowSink> = match self.sink {
            SinkKind::Csv => Box::new(
                CsvSink::new(&self.output_dir).context("Failed to prepare CSV output")?,
            ),
            SinkKind::Sqlite => Box::new(
                SqliteSink::open(self.output_dir.join(&self.sqlite_file))
                    .context("Failed to open SQLite output")?,
            ),
        };
        Ok(sink)
    }
}
