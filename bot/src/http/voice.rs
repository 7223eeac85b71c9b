//! Voice-agent provider client

use async_trait::async_trait;
use provider_api::models::voice::{
    AssistantModel, AssistantResponse, AssistantVoice, CreateAssistantRequest, ModelMessage,
};
use secrecy::SecretString;
use serde_json::json;

use crate::errors::BotError;
use crate::http::client::HttpClient;
use crate::models::practice::PracticeRecord;
use crate::providers::VoiceAgentProvider;
use crate::storage::settings::ProviderSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.vapi.ai";
const SERVICE: &str = "voice provider";
const MAX_ASSISTANT_NAME: usize = 40;

pub struct VoiceAgentClient {
    http: HttpClient,
    configured: bool,
}

impl VoiceAgentClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, BotError> {
        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut http = HttpClient::new(SERVICE, base_url)?;
        let configured = settings.api_key.is_some();
        if let Some(key) = settings.api_key.clone() {
            http = http.with_bearer(SecretString::from(key));
        }
        Ok(Self { http, configured })
    }
}

/// Assistant definition for a practice's receptionist
pub fn assistant_request(record: &PracticeRecord) -> CreateAssistantRequest {
    let services = if record.services.is_empty() {
        "general care".to_string()
    } else {
        record.services.join(", ")
    };

    let mut prompt = format!(
        "You are the friendly receptionist of {}, located at {}. The practice offers: {}. \
         Answer questions about the practice and help callers book an appointment.",
        record.name, record.address, services
    );
    if let Some(phone) = record.phone.as_deref() {
        prompt.push_str(&format!(" The office phone number is {}.", phone));
    }

    CreateAssistantRequest {
        name: record.name.chars().take(MAX_ASSISTANT_NAME).collect(),
        first_message: format!(
            "Thank you for calling {}. How can I help you today?",
            record.name
        ),
        model: AssistantModel {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            messages: vec![ModelMessage {
                role: "system".to_string(),
                content: prompt,
            }],
        },
        voice: Some(AssistantVoice {
            provider: "11labs".to_string(),
            voice_id: "sarah".to_string(),
        }),
        metadata: json!({
            "slug": record.slug,
            "website": record.website,
        }),
    }
}

#[async_trait]
impl VoiceAgentProvider for VoiceAgentClient {
    async fn create_agent(&self, record: &PracticeRecord) -> Result<String, BotError> {
        if !self.configured {
            return Err(BotError::Config("Voice provider API key not configured".to_string()));
        }

        let response: AssistantResponse = self
            .http
            .post("/assistant", &assistant_request(record))
            .await?;

        if response.id.trim().is_empty() {
            return Err(BotError::Validation(
                "Voice provider returned an assistant without id".to_string(),
            ));
        }
        Ok(response.id)
    }
}
