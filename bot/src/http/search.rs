//! Search provider client used for practice discovery

use async_trait::async_trait;
use provider_api::models::search::SearchResponse;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::errors::BotError;
use crate::http::client::HttpClient;
use crate::models::practice::DiscoveryQuery;
use crate::providers::Discoverer;
use crate::storage::settings::ProviderSettings;

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const SERVICE: &str = "search provider";

/// Listing and review sites that are not practice websites
const DIRECTORY_HOSTS: &[&str] = &[
    "yelp.com",
    "healthgrades.com",
    "zocdoc.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "yellowpages.com",
    "webmd.com",
    "vitals.com",
    "google.com",
];

pub struct SearchClient {
    http: HttpClient,
    api_key: Option<SecretString>,
}

impl SearchClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, BotError> {
        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            http: HttpClient::new(SERVICE, base_url)?,
            api_key: settings.api_key.clone().map(SecretString::from),
        })
    }
}

/// Practice website links from a search response, one per host
pub fn practice_links(response: &SearchResponse, limit: usize) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    let mut links = Vec::new();

    for result in &response.organic_results {
        let Ok(parsed) = url::Url::parse(&result.link) else {
            continue;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            continue;
        }
        let Some(host) = parsed.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()) else {
            continue;
        };
        let is_directory = DIRECTORY_HOSTS
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)));
        if is_directory || hosts.contains(&host) {
            debug!("Skipping search result {}", result.link);
            continue;
        }
        hosts.push(host);
        links.push(result.link.clone());
        if links.len() == limit {
            break;
        }
    }

    links
}

#[async_trait]
impl Discoverer for SearchClient {
    async fn discover(&self, query: &DiscoveryQuery) -> Result<Vec<String>, BotError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| BotError::Config("Search API key not configured".to_string()))?;

        let text = query.query_text();
        // Ask for extra results since directory sites are dropped
        let num = (query.limit * 2).clamp(10, 100).to_string();
        let response: SearchResponse = self
            .http
            .get(
                "/search.json",
                &[
                    ("engine", "google"),
                    ("q", &text),
                    ("num", &num),
                    ("api_key", api_key.expose_secret()),
                ],
            )
            .await?;

        if let Some(error) = response.error.as_deref() {
            return Err(BotError::remote(SERVICE, error));
        }
        Ok(practice_links(&response, query.limit))
    }
}
