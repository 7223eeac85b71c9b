//! Lead database client

use async_trait::async_trait;
use provider_api::models::leads::{property, CreatePageRequest, DatabaseParent, PageResponse};
use secrecy::SecretString;
use serde_json::{Map, Value};

use crate::errors::BotError;
use crate::http::client::HttpClient;
use crate::models::lead::LeadRecord;
use crate::providers::LeadStore;
use crate::storage::settings::LeadsSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const API_VERSION: &str = "2022-06-28";
const SERVICE: &str = "lead database";

pub struct LeadDatabaseClient {
    http: HttpClient,
    database_id: Option<String>,
    configured: bool,
}

impl LeadDatabaseClient {
    pub fn new(settings: &LeadsSettings) -> Result<Self, BotError> {
        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut http = HttpClient::new(SERVICE, base_url)?.with_header("Notion-Version", API_VERSION)?;
        let configured = settings.api_key.is_some();
        if let Some(key) = settings.api_key.clone() {
            http = http.with_bearer(SecretString::from(key));
        }
        Ok(Self {
            http,
            database_id: settings.database_id.clone(),
            configured,
        })
    }
}

/// Database page properties for a lead
pub fn lead_properties(lead: &LeadRecord) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("Name".to_string(), property::title(&lead.name));
    properties.insert("Address".to_string(), property::rich_text(&lead.address));
    // Select options may not contain commas
    let services: Vec<String> = lead.services.iter().map(|s| s.replace(',', " ")).collect();
    properties.insert("Services".to_string(), property::multi_select(&services));
    properties.insert("Phone".to_string(), property::phone(&lead.phone));
    properties.insert("Email".to_string(), property::email(&lead.email));
    properties.insert("Website".to_string(), property::url(&lead.website));
    if !lead.practice_type.is_empty() {
        properties.insert(
            "Practice Type".to_string(),
            property::select(&lead.practice_type.replace(',', " ")),
        );
    }
    properties.insert("Lead Score".to_string(), property::number(f64::from(lead.lead_score)));
    properties.insert("Slug".to_string(), property::rich_text(&lead.slug));
    properties.insert("Agent ID".to_string(), property::rich_text(&lead.agent_id));
    properties.insert("Status".to_string(), property::select("New"));
    properties
}

#[async_trait]
impl LeadStore for LeadDatabaseClient {
    async fn store_lead(&self, lead: &LeadRecord) -> Result<String, BotError> {
        let database_id = match (&self.database_id, self.configured) {
            (Some(id), true) => id.clone(),
            _ => {
                return Err(BotError::Config(
                    "Lead database API key or database id not configured".to_string(),
                ))
            }
        };

        let request = CreatePageRequest {
            parent: DatabaseParent { database_id },
            properties: lead_properties(lead),
        };
        let page: PageResponse = self.http.post("/v1/pages", &request).await?;

        if page.id.trim().is_empty() {
            return Err(BotError::Validation(
                "Lead database returned a page without id".to_string(),
            ));
        }
        Ok(page.id)
    }
}
