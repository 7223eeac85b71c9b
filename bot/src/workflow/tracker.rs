//! Which phase the runner is in

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::report::PhaseName;

pub const IDLE: &str = "idle";

/// A workflow that has not finished yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlight {
    pub workflow_id: Uuid,
    pub url: String,
    pub phase: PhaseName,
    pub entered_at: DateTime<Utc>,
}

#[derive(Default)]
struct TrackerState {
    in_flight: HashMap<Uuid, InFlight>,
    last: Option<InFlight>,
}

/// Phase state shared by concurrently running workflows
#[derive(Default)]
pub struct PhaseTracker {
    state: RwLock<TrackerState>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a workflow until the returned guard is dropped
    ///
    /// The entry is removed even when the workflow future is cancelled or a
    /// collaborator panics part way through.
    pub fn start(&self, workflow_id: Uuid, url: &str) -> TrackerGuard<'_> {
        self.enter(workflow_id, url, PhaseName::Scrape);
        TrackerGuard {
            tracker: self,
            workflow_id,
            url: url.to_string(),
        }
    }

    /// Record that a workflow entered a phase
    pub fn enter(&self, workflow_id: Uuid, url: &str, phase: PhaseName) {
        let entry = InFlight {
            workflow_id,
            url: url.to_string(),
            phase,
            entered_at: Utc::now(),
        };
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.in_flight.insert(workflow_id, entry.clone());
        state.last = Some(entry);
    }

    pub fn finish(&self, workflow_id: Uuid) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.in_flight.remove(&workflow_id);
    }

    /// Most recently entered phase, or `idle` when nothing runs
    pub fn current_phase(&self) -> String {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        if state.in_flight.is_empty() {
            return IDLE.to_string();
        }
        state
            .last
            .as_ref()
            .map(|entry| entry.phase.to_string())
            .unwrap_or_else(|| IDLE.to_string())
    }

    /// In-flight workflows, oldest phase entry first
    pub fn in_flight(&self) -> Vec<InFlight> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<InFlight> = state.in_flight.values().cloned().collect();
        entries.sort_by_key(|e| e.entered_at);
        entries
    }
}

/// Keeps one workflow in the tracker while alive
pub struct TrackerGuard<'a> {
    tracker: &'a PhaseTracker,
    workflow_id: Uuid,
    url: String,
}

impl TrackerGuard<'_> {
    pub fn enter(&self, phase: PhaseName) {
        self.tracker.enter(self.workflow_id, &self.url, phase);
    }
}

impl Drop for TrackerGuard<'_> {
    fn drop(&mut self) {
        self.tracker.finish(self.workflow_id);
    }
}
