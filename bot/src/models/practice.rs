//! Targets and scraped practice data

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BotError;

const SLUG_BASE_CHARS: usize = 40;

/// One unit of work: a practice website URL plus optional classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Normalized URL (an `https://` scheme is added when missing)
    pub url: String,

    /// Practice type used by the discovery variant, e.g. "dentist"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_type: Option<String>,

    /// Free-text location used by the discovery variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Target {
    /// Create a target from a raw URL
    pub fn new(url: &str) -> Result<Self, BotError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(BotError::InvalidTarget("URL must not be empty".to_string()));
        }

        let url = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        Ok(Self {
            url,
            practice_type: None,
            location: None,
        })
    }

    /// Attach the discovery classification
    pub fn with_classification(
        mut self,
        practice_type: Option<String>,
        location: Option<String>,
    ) -> Self {
        self.practice_type = practice_type;
        self.location = location;
        self
    }

    /// Hostname of the target URL, without a leading `www.`
    pub fn hostname(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }
}

/// Search-and-discover request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    pub practice_type: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default = "default_discovery_limit")]
    pub limit: usize,
}

fn default_discovery_limit() -> usize {
    10
}

impl DiscoveryQuery {
    pub fn new(practice_type: impl Into<String>, location: Option<String>) -> Self {
        Self {
            practice_type: practice_type.into(),
            location,
            limit: default_discovery_limit(),
        }
    }

    /// Free-text query sent to the search provider
    pub fn query_text(&self) -> String {
        match self.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => {
                format!("{} in {}", self.practice_type.trim(), location)
            }
            _ => self.practice_type.trim().to_string(),
        }
    }
}

/// Practice data produced by the scrape phase and consumed by every later phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeRecord {
    pub name: String,

    /// Address or location line
    pub address: String,

    /// Service / treatment labels
    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Source website
    pub website: String,

    #[serde(default)]
    pub practice_type: Option<String>,

    /// Unclamped lead score reported by the scraper
    #[serde(default)]
    pub lead_score: i64,

    /// URL-safe identifier, unique per run
    #[serde(default)]
    pub slug: String,
}

impl PracticeRecord {
    /// Derive the identifier from the name, a timestamp and the workflow id
    ///
    /// Concurrent workflows for the same name share the timestamp, so the
    /// first eight hex digits of the workflow id keep slugs apart. The result
    /// stays within a 63 character DNS label.
    pub fn assign_slug(&mut self, timestamp_millis: i64, workflow_id: Uuid) {
        let mut base = slugify(&self.name);
        base.truncate(SLUG_BASE_CHARS);
        let base = base.trim_end_matches('-');
        let base = if base.is_empty() { "practice" } else { base };
        let run = workflow_id.simple().to_string();
        self.slug = format!("{}-{}-{}", base, timestamp_millis, &run[..8]);
    }
}

/// Lowercase ASCII slug, words joined by `-`, at most 48 characters
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= 48 {
            break;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Reference to the voice agent created for a practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub agent_id: String,

    /// The identifier was generated locally
    pub is_fallback: bool,
}
