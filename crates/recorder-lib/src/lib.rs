//! Library for the cluster health dataset recorder
//!
//! This crate provides the core functionality for:
//! - Deduplicating cluster events and correlating them to resources
//! - Classifying resources into a fixed taxonomy of error conditions
//! - Assembling metric snapshots from a PromQL endpoint
//! - Persisting enriched rows as CSV or SQLite tables
//! - Health checks and observability

pub mod classifier;
pub mod cluster;
pub mod cycle;
pub mod error;
pub mod events;
pub mod health;
pub mod metrics;
pub mod models;
pub mod observability;
pub mod sink;

pub use error::{ClassifyError, RecorderError, SinkError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, LastCycle, ReadinessResponse,
};
pub use models::*;
pub use observability::{RecorderMetrics, StructuredLogger};
