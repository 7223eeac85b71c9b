//! Bounded in-memory log of finished workflow reports

use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::models::report::{WorkflowReport, WorkflowStatus};

/// Query over the results log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsFilter {
    pub status: Option<WorkflowStatus>,

    /// Case-insensitive substring of the target URL
    pub url_contains: Option<String>,

    /// Only reports finished at or after this instant
    pub since: Option<DateTime<Utc>>,

    pub limit: Option<usize>,
}

impl ResultsFilter {
    pub fn matches(&self, report: &WorkflowReport) -> bool {
        if let Some(status) = self.status {
            if report.workflow_status != status {
                return false;
            }
        }
        if let Some(needle) = self.url_contains.as_deref() {
            if !report
                .target
                .url
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(since) = self.since {
            if report.finished_at < since {
                return false;
            }
        }
        true
    }
}

/// Ring buffer of reports; the oldest report is evicted at capacity
pub struct ResultsLog {
    entries: RwLock<VecDeque<WorkflowReport>>,
    capacity: usize,
}

impl ResultsLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn push(&self, report: WorkflowReport) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(report);
    }

    /// Matching reports, newest first
    pub fn query(&self, filter: &ResultsFilter) -> Vec<WorkflowReport> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .rev()
            .filter(|report| filter.matches(report))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Every report, oldest first
    pub fn snapshot(&self) -> Vec<WorkflowReport> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultsLog {
    fn default() -> Self {
        Self::new(500)
    }
}
