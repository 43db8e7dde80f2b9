//! The recording cycle
//!
//! This module provides:
//! - `CycleRunner`, which executes one full pass over the cluster
//! - `Scheduler`, which repeats passes at a fixed interval until shutdown
//! - Pod to deployment owner resolution
//! - Injectable time sources so ticks are testable without real waits

mod owner;
mod runner;
mod scheduler;


pub use owner::OwnerResolution;
pub use runner::{Collaborators, CycleReport, CycleRunner, NO_DEPLOYMENT};
pub use scheduler::Scheduler;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of row timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Waits between cycles
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
