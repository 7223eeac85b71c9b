//! Lead bot API models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Single target request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
}

/// Batch request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub urls: Vec<String>,
}

/// Search-and-discover request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub practice_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string of `GET /results`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A target that has not finished its workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InFlightTarget {
    pub workflow_id: Uuid,
    pub url: String,
    pub phase: String,
    pub entered_at: DateTime<Utc>,
}

/// Status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub current_phase: String,
    pub in_flight: Vec<InFlightTarget>,
    pub total_processed: usize,
    pub results_capacity: usize,
    pub concurrency_limit: usize,
}

/// Batch response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub total: usize,
    pub reported: usize,
    pub failed: usize,
    pub outcomes: Vec<serde_json::Value>,
}

/// Deployed demo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentEntry {
    pub workflow_id: Uuid,
    pub practice_name: String,
    pub target_url: String,
    pub url: String,
    pub method: String,
    pub is_mock: bool,
    pub deployed_at: DateTime<Utc>,
}

/// Deployments response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentListResponse {
    pub deployments: Vec<DeploymentEntry>,
    pub total: usize,
}

/// Per-phase counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub phase: String,
    pub successes: usize,
    pub fallbacks: usize,
    pub failures: usize,
}

/// Aggregate statistics over the results log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub total: usize,
    pub complete: usize,
    pub partial_success: usize,
    pub failed: usize,
    pub degraded: usize,
    pub phases: Vec<PhaseStats>,
    pub average_duration_ms: u64,
    pub deployments: usize,
    pub mock_deployments: usize,
    pub methods: BTreeMap<String, usize>,
}

/// Provider configuration status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub configured: bool,
}

/// Workflow tuning summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub concurrency_limit: usize,
    pub batch_delay_ms: u64,
    pub call_timeout_secs: u64,
    pub results_capacity: usize,
    pub strategies: Vec<String>,
}

/// Diagnostics response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub version: VersionResponse,
    pub providers: Vec<ProviderStatus>,
    pub workflow: WorkflowSummary,
    pub chat_enabled: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
