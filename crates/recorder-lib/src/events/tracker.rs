//! Deduplication of cluster events across polls

use crate::models::ClusterEvent;
use std::collections::HashSet;
use tracing::debug;

/// Remembers every event uid it has emitted
///
/// The set only grows for the lifetime of the value; nothing is persisted,
/// so a restarted process treats all currently existing events as new once.
/// Not synchronized: a single owner drives it.
#[derive(Debug, Default)]
pub struct EventTracker {
    seen: HashSet<String>,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the events whose uid has not been emitted before, in input order
    pub fn new_events(&mut self, all_events: Vec<ClusterEvent>) -> Vec<ClusterEvent> {
        let total = all_events.len();
        let fresh: Vec<ClusterEvent> = all_events
            .into_iter()
            .filter(|event| self.seen.insert(event.uid.clone()))
            .collect();

        debug!(
            total = total,
            new = fresh.len(),
            tracked = self.seen.len(),
            "Filtered cluster events"
        );
        fresh
    }

    /// Number of uids seen so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn has_seen(&self, uid: &str) -> bool {
        self.seen.contains(uid)
    }
}
