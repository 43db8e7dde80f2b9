//! Health tracking for the recorder
//!
//! Each collaborator of a cycle reports into a shared registry that backs the
//! liveness and readiness probes. The recorder becomes ready once a cycle has
//! been persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Working, but the last cycle lost data from this component
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        !matches!(self, ComponentStatus::Unhealthy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn at(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::at(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::at(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::at(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Summary of the most recent persisted cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCycle {
    pub tick: u64,
    pub rows_written: usize,
    pub completed_timestamp: i64,
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle: Option<LastCycle>,
}

impl HealthResponse {
    /// The worst status among components; healthy when there are none
    pub fn compute_status(components: &BTreeMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy)
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const CLUSTER: &str = "cluster";
    pub const METRICS_STORE: &str = "metrics_store";
    pub const SINK: &str = "sink";
    pub const SCHEDULER: &str = "scheduler";

    pub const ALL: [&str; 4] = [CLUSTER, METRICS_STORE, SINK, SCHEDULER];
}

#[derive(Debug, Default)]
struct RegistryState {
    components: BTreeMap<String, ComponentHealth>,
    last_cycle: Option<LastCycle>,
}

/// Shared registry of component health
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every recorder component marked healthy
    pub async fn with_components() -> Self {
        let registry = Self::new();
        for name in components::ALL {
            registry.set_healthy(name).await;
        }
        registry
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        self.state
            .write()
            .await
            .components
            .insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    /// Record a persisted cycle
    pub async fn record_cycle(&self, tick: u64, rows_written: usize) {
        self.state.write().await.last_cycle = Some(LastCycle {
            tick,
            rows_written,
            completed_timestamp: chrono::Utc::now().timestamp(),
        });
    }

    pub async fn last_cycle(&self) -> Option<LastCycle> {
        self.state.read().await.last_cycle
    }

    pub async fn health(&self) -> HealthResponse {
        let state = self.state.read().await;
        HealthResponse {
            status: HealthResponse::compute_status(&state.components),
            components: state.components.clone(),
            last_cycle: state.last_cycle,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;

        let reason = if state.last_cycle.is_none() {
            Some("No cycle persisted yet".to_string())
        } else {
            state
                .components
                .iter()
                .find(|(_, c)| !c.status.is_operational())
                .map(|(name, _)| format!("Component {} unhealthy", name))
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}
