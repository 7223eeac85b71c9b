//! Collaborator interfaces consumed by the workflow controller
//!
//! Every external service is reached through one of these traits so the
//! controller can treat it as an opaque remote procedure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BotError;
use crate::models::deployment::FileSet;
use crate::models::lead::LeadRecord;
use crate::models::practice::{DiscoveryQuery, PracticeRecord, Target};

/// Extracts practice data from a website
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, target: &Target) -> Result<PracticeRecord, BotError>;
}

/// Creates a conversational voice agent for a practice
#[async_trait]
pub trait VoiceAgentProvider: Send + Sync {
    /// Returns the provider's opaque agent identifier
    async fn create_agent(&self, record: &PracticeRecord) -> Result<String, BotError>;
}

/// Persists lead records
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Returns the identifier of the stored lead
    async fn store_lead(&self, lead: &LeadRecord) -> Result<String, BotError>;
}

/// Repository created on the source-repo host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub html_url: String,
    pub default_branch: String,
}

impl RepoRef {
    /// Parse an `owner/name` reference to an existing repository
    pub fn parse(full_name: &str) -> Result<Self, BotError> {
        let (owner, name) = full_name
            .trim()
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
            .ok_or_else(|| {
                BotError::Validation(format!("Repository must be owner/name: {}", full_name))
            })?;

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            html_url: String::new(),
            default_branch: "main".to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Source-control host
#[async_trait]
pub trait RepoHost: Send + Sync {
    async fn create_repo(&self, name: &str, files: &FileSet) -> Result<RepoRef, BotError>;
}

/// Project on the deploy host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

/// Service on the deploy host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: String,
    pub project_id: String,
}

/// What a deploy-host service runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceSource {
    Repo { full_name: String, branch: String },
    Image { image: String },
}

/// Hosting platform
#[async_trait]
pub trait DeployHost: Send + Sync {
    async fn create_project(&self, name: &str) -> Result<ProjectRef, BotError>;

    async fn create_service(
        &self,
        project: &ProjectRef,
        source: ServiceSource,
        env: Vec<(String, String)>,
    ) -> Result<ServiceRef, BotError>;

    /// Returns the public URL of the service
    async fn create_domain(&self, service: &ServiceRef) -> Result<String, BotError>;
}

/// Incoming chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUpdate {
    pub update_id: i64,
    pub chat_id: i64,
    pub text: String,
}

/// Chat-bot messaging transport
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError>;

    /// Long-poll for messages newer than `offset`
    async fn get_updates(&self, offset: i64, timeout_secs: u64)
        -> Result<Vec<ChatUpdate>, BotError>;
}

/// Finds practice websites for a search query
#[async_trait]
pub trait Discoverer: Send + Sync {
    async fn discover(&self, query: &DiscoveryQuery) -> Result<Vec<String>, BotError>;
}
