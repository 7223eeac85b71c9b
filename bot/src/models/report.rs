//! Per-phase results and the aggregate workflow report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BotError, FailureKind};
use crate::models::deployment::{DeploymentRecord, DeploymentStatus};
use crate::models::lead::LeadRecord;
use crate::models::practice::{AgentRef, PracticeRecord, Target};

/// Workflow phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Scrape,
    VoiceAgent,
    LeadStorage,
    Deployment,
    Finalize,
}

impl PhaseName {
    /// The four phases that produce a `PhaseResult`
    pub const REPORTED: [PhaseName; 4] = [
        PhaseName::Scrape,
        PhaseName::VoiceAgent,
        PhaseName::LeadStorage,
        PhaseName::Deployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Scrape => "scrape",
            PhaseName::VoiceAgent => "voice_agent",
            PhaseName::LeadStorage => "lead_storage",
            PhaseName::Deployment => "deployment",
            PhaseName::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult<T> {
    pub phase: PhaseName,
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,

    /// Locally synthesized data replaced the collaborator's answer
    pub fallback_used: bool,

    /// Strategy or source that produced the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    pub duration_ms: u64,

    pub payload: T,
}

impl<T> PhaseResult<T> {
    /// The collaborator answered and the answer was accepted
    pub fn succeeded(phase: PhaseName, payload: T) -> Self {
        Self {
            phase,
            success: true,
            error: None,
            error_kind: None,
            fallback_used: false,
            method: None,
            duration_ms: 0,
            payload,
        }
    }

    /// The collaborator failed and fallback data was substituted
    pub fn degraded(phase: PhaseName, payload: T, err: &BotError) -> Self {
        Self {
            phase,
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            fallback_used: true,
            method: None,
            duration_ms: 0,
            payload,
        }
    }

    /// The phase failed and only a placeholder payload is available
    pub fn failed(phase: PhaseName, payload: T, err: &BotError) -> Self {
        Self {
            phase,
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            fallback_used: false,
            method: None,
            duration_ms: 0,
            payload,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_fallback(mut self, fallback_used: bool) -> Self {
        self.fallback_used = fallback_used;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Overall workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStatus {
    Complete,
    PartialSuccess,
    Failed,
}

impl WorkflowStatus {
    /// `complete` iff every phase succeeded, `partial-success` iff at least one did
    pub fn from_counts(successes: usize, total: usize) -> Self {
        if total > 0 && successes == total {
            WorkflowStatus::Complete
        } else if successes > 0 {
            WorkflowStatus::PartialSuccess
        } else {
            WorkflowStatus::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Complete => "complete",
            WorkflowStatus::PartialSuccess => "partial-success",
            WorkflowStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Ok(WorkflowStatus::Complete),
            "partial-success" | "partial" => Ok(WorkflowStatus::PartialSuccess),
            "failed" => Ok(WorkflowStatus::Failed),
            other => Err(format!("Unknown workflow status: {}", other)),
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a phase fell back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackReason {
    pub phase: PhaseName,
    pub reason: String,
}

/// Aggregate outcome for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub id: Uuid,
    pub target: Target,
    pub workflow_status: WorkflowStatus,
    pub scrape: PhaseResult<PracticeRecord>,
    pub voice_agent: PhaseResult<AgentRef>,
    /// Lead database phase
    pub notion: PhaseResult<LeadRecord>,
    pub deployment: PhaseResult<DeploymentRecord>,
    pub fallbacks: Vec<FallbackReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl WorkflowReport {
    /// Success flags of the reported phases, in order
    pub fn phase_successes(&self) -> [(PhaseName, bool, bool); 4] {
        [
            (PhaseName::Scrape, self.scrape.success, self.scrape.fallback_used),
            (
                PhaseName::VoiceAgent,
                self.voice_agent.success,
                self.voice_agent.fallback_used,
            ),
            (PhaseName::LeadStorage, self.notion.success, self.notion.fallback_used),
            (
                PhaseName::Deployment,
                self.deployment.success,
                self.deployment.fallback_used,
            ),
        ]
    }

    pub fn success_count(&self) -> usize {
        self.phase_successes().iter().filter(|(_, ok, _)| *ok).count()
    }

    /// Any phase substituted fallback data
    pub fn is_degraded(&self) -> bool {
        self.phase_successes().iter().any(|(_, _, fallback)| *fallback)
    }

    pub fn practice_name(&self) -> &str {
        &self.scrape.payload.name
    }

    /// Demo URL when a deployment (real or mock) exists
    pub fn deployment_url(&self) -> Option<&str> {
        let record = &self.deployment.payload;
        if record.status == DeploymentStatus::Deployed && !record.url.is_empty() {
            Some(&record.url)
        } else {
            None
        }
    }
}

/// Per-target result of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Report(Box<WorkflowReport>),
    Failed { target: String, error: String },
}

impl BatchOutcome {
    pub fn report(&self) -> Option<&WorkflowReport> {
        match self {
            BatchOutcome::Report(report) => Some(report),
            BatchOutcome::Failed { .. } => None,
        }
    }

    pub fn target_url(&self) -> &str {
        match self {
            BatchOutcome::Report(report) => &report.target.url,
            BatchOutcome::Failed { target, .. } => target,
        }
    }
}
