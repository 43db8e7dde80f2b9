//! Prometheus instant query client

use super::MetricEvaluator;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use url::Url;

const QUERY_PATH: &str = "api/v1/query";

/// Client for `GET /api/v1/query`
pub struct PrometheusClient {
    client: Client,
    query_url: Url,
}

impl PrometheusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let mut base = Url::parse(base_url).context("Invalid Prometheus URL")?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let query_url = base.join(QUERY_PATH).context("Invalid Prometheus URL")?;

        Ok(Self { client, query_url })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
enum QueryData {
    Vector(Vec<Sample>),
    Scalar((f64, String)),
    Matrix(serde_json::Value),
    String(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct Sample {
    value: (f64, String),
}

impl QueryData {
    /// Raw value of the first sample, if any
    fn first_value(&self) -> Option<&str> {
        match self {
            QueryData::Vector(samples) => samples.first().map(|s| s.value.1.as_str()),
            QueryData::Scalar((_, value)) => Some(value.as_str()),
            QueryData::Matrix(_) | QueryData::String(_) => None,
        }
    }
}

/// Parse a sample value; non-finite values are treated as absent
fn parse_value(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[async_trait]
impl MetricEvaluator for PrometheusClient {
    async fn evaluate(&self, query: &str) -> Result<Option<f64>> {
        let response = self
            .client
            .get(self.query_url.clone())
            .query(&[("query", query)])
            .send()
            .await
            .context("Failed to reach Prometheus")?;

        let status = response.status();
        if status.is_server_error() {
            anyhow::bail!("Prometheus error ({})", status);
        }

        let body: QueryResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(query, error = %e, "Unreadable Prometheus response");
                return Ok(None);
            }
        };

        if body.status != "success" {
            warn!(
                query,
                error = body.error.as_deref().unwrap_or("unknown"),
                "Prometheus rejected query"
            );
            return Ok(None);
        }

        let value = body
            .data
            .as_ref()
            .and_then(QueryData::first_value)
            .and_then(|raw| {
                let parsed = parse_value(raw);
                if parsed.is_none() {
                    warn!(query, raw, "Discarding non-numeric sample");
                }
                parsed
            });

        Ok(value)
    }
}
