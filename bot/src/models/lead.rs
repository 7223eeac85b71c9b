//! Sanitized lead records

use serde::{Deserialize, Serialize};

/// Where the lead record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    /// Not yet written
    Pending,
    /// Accepted by the lead database
    Stored,
    /// Kept locally because the lead database call failed
    Fallback,
}

/// Lead record sent to the lead database, every text field already sanitized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: String,
    pub address: String,
    pub services: Vec<String>,
    /// Empty when the scraped value was invalid
    pub phone: String,
    /// Empty when the scraped value was invalid
    pub email: String,
    /// Empty when the scraped value was invalid
    pub website: String,
    pub practice_type: String,
    /// Clamped to `0..=100`
    pub lead_score: u8,
    pub slug: String,
    pub agent_id: String,
    pub status: LeadStatus,
    /// Identifier assigned by the lead database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
}

impl LeadRecord {
    pub fn is_fallback(&self) -> bool {
        self.status == LeadStatus::Fallback
    }

    /// Mark the record as stored under the given identifier
    pub fn stored(mut self, lead_id: String) -> Self {
        self.status = LeadStatus::Stored;
        self.lead_id = Some(lead_id);
        self
    }

    /// Mark the record as a local fallback copy
    pub fn fallback(mut self) -> Self {
        self.status = LeadStatus::Fallback;
        self.lead_id = None;
        self
    }
}
