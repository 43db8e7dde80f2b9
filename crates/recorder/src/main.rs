//! Health recorder
//!
//! Polls the cluster and Prometheus at a fixed interval and appends one row
//! per node, deployment and pod, labelled with binary error flags.

use anyhow::{Context, Result};
use clap::Parser;
use health_recorder::{api, config::RecorderConfig};
use recorder_lib::{
    cluster::KubeCluster,
    cycle::{Collaborators, CycleRunner, Scheduler, SystemClock, TokioSleeper},
    health::HealthRegistry,
    metrics::PrometheusClient,
    observability::{RecorderMetrics, StructuredLogger},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const RECORDER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "health-recorder")]
#[command(author, version, about = "Records labelled cluster health rows", long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, env = "RECORDER_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let config = RecorderConfig::load(cli.config.as_deref())?;
    info!(
        prometheus_url = %config.prometheus_url,
        interval_secs = config.polling_interval_secs,
        sink = ?config.sink,
        "Recorder configured"
    );

    let health = HealthRegistry::with_components().await;
    let _metrics = RecorderMetrics::new();
    let logger = StructuredLogger::new(config.cluster_label());

    let cluster = Arc::new(
        KubeCluster::connect(config.kube_context.as_deref())
            .await
            .context("Failed to connect to the cluster")?,
    );
    let prometheus = Arc::new(PrometheusClient::new(
        &config.prometheus_url,
        config.prometheus_timeout(),
    )?);
    let sink = config.open_sink()?;
    logger.log_startup(RECORDER_VERSION, &config.prometheus_url, &sink.describe());

    let mut runner = CycleRunner::new(
        Collaborators {
            lister: cluster.clone(),
            events: cluster,
            evaluator: prometheus,
            sink,
            clock: Arc::new(SystemClock),
        },
        &config.thresholds,
        config.owner_resolution,
        health.clone(),
        logger.clone(),
    )?;

    if cli.once {
        let report = runner.tick().await?;
        info!(
            rows = report.rows_written,
            new_events = report.new_events,
            "Single cycle completed"
        );
        logger.log_shutdown("single cycle requested");
        return Ok(());
    }

    if config.api_port != 0 {
        let state = Arc::new(api::AppState::new(health.clone()));
        let port = config.api_port;
        tokio::spawn(async move {
            if let Err(e) = api::serve(port, state).await {
                error!(error = %e, "API server stopped");
            }
        });
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, finishing current cycle");
            let _ = shutdown_tx.send(());
        }
    });

    let scheduler = Scheduler::new(
        runner,
        config.polling_interval(),
        Arc::new(TokioSleeper),
        health,
        logger.clone(),
    );

    match scheduler.run(shutdown_rx).await {
        Ok(cycles) => {
            info!(cycles, "Recorder stopped");
            logger.log_shutdown("SIGINT received");
            Ok(())
        }
        Err(e) => {
            logger.log_shutdown("fatal error");
            Err(e.into())
        }
    }
}
