//! Demo artifact and deployment models

use serde::{Deserialize, Serialize};

/// A generated source file of the demo artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the repository root
    pub path: String,
    pub content: String,
}

/// Files making up one demo artifact
pub type FileSet = Vec<GeneratedFile>;

/// Outcome of the deployment phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Deployed,
    Failed,
}

/// One strategy attempt, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: String,

    /// Error message when the strategy failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Deployment produced by the winning strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Name of the strategy that produced this record
    pub method: String,

    /// Public demo URL, empty on failure
    pub url: String,

    /// Repository backing the deployment, as `owner/name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Service identifier on the deploy host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    /// The URL was fabricated, nothing was deployed
    #[serde(default)]
    pub is_mock: bool,

    pub status: DeploymentStatus,

    /// Every strategy tried, in order
    #[serde(default)]
    pub attempts: Vec<StrategyAttempt>,
}

impl DeploymentRecord {
    pub fn deployed(method: &str, url: String) -> Self {
        Self {
            method: method.to_string(),
            url,
            repo: None,
            service_id: None,
            is_mock: false,
            status: DeploymentStatus::Deployed,
            attempts: Vec::new(),
        }
    }

    /// Placeholder used when every strategy failed
    pub fn failed(attempts: Vec<StrategyAttempt>) -> Self {
        Self {
            method: "none".to_string(),
            url: String::new(),
            repo: None,
            service_id: None,
            is_mock: false,
            status: DeploymentStatus::Failed,
            attempts,
        }
    }
}
