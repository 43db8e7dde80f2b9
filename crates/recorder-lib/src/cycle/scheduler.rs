use super::{CycleRunner, Sleeper};
use crate::error::Result;
use crate::health::{components, HealthRegistry};
use crate::observability::StructuredLogger;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

/// Repeats cycles at a fixed interval until shutdown or a fatal error
pub struct Scheduler {
    runner: CycleRunner,
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
    health: HealthRegistry,
    logger: StructuredLogger,
}

impl Scheduler {
    pub fn new(
        runner: CycleRunner,
        interval: Duration,
        sleeper: Arc<dyn Sleeper>,
        health: HealthRegistry,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            runner,
            interval,
            sleeper,
            health,
            logger,
        }
    }

    /// Run until `shutdown` fires. Returns the number of completed cycles.
    ///
    /// A shutdown signal is honoured between cycles; an in-flight cycle runs
    /// to completion. Fatal cycle errors stop the loop and are returned.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<u64> {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            "Starting collection scheduler"
        );
        self.health.set_healthy(components::SCHEDULER).await;
        let mut completed = 0u64;

        loop {
            if shutdown_requested(&mut shutdown) {
                break;
            }

            match self.runner.tick().await {
                Ok(_) => completed += 1,
                Err(e) if e.is_fatal() => {
                    self.logger.log_fatal(self.runner.ticks(), &e.to_string());
                    self.health
                        .set_unhealthy(components::SCHEDULER, e.to_string())
                        .await;
                    return Err(e);
                }
                Err(e) => {
                    warn!(tick = self.runner.ticks(), error = %e, "Cycle failed");
                }
            }

            tokio::select! {
                _ = self.sleeper.sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        info!(cycles = completed, "Collection scheduler stopped");
        self.health
            .set_degraded(components::SCHEDULER, "stopped")
            .await;
        Ok(completed)
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    match shutdown.try_recv() {
        Err(TryRecvError::Empty) => false,
        Ok(()) | Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => true,
    }
}
