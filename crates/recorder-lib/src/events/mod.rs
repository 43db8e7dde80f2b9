//! Cluster event handling
//!
//! This module provides:
//! - A tracker that remembers processed event uids and only surfaces new ones
//! - Correlation of events to the node, pod or deployment they describe

mod correlator;
mod tracker;

pub use correlator::{for_deployment, for_node, for_pod};
pub use tracker::EventTracker;
