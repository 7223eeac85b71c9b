//! Chat-bot transport client

use std::time::Duration;

use async_trait::async_trait;
use provider_api::models::chat::{BotResponse, SendMessageRequest, Update};
use secrecy::{ExposeSecret, SecretString};

use crate::errors::BotError;
use crate::http::client::HttpClient;
use crate::providers::{ChatTransport, ChatUpdate};
use crate::storage::settings::ChatSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const SERVICE: &str = "chat transport";

/// Longest message the transport accepts
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub struct ChatClient {
    http: HttpClient,
    configured: bool,
}

impl ChatClient {
    pub fn new(settings: &ChatSettings) -> Result<Self, BotError> {
        let base_url = settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let token = settings.bot_token.clone().map(SecretString::from);

        // The bot API carries the token in the path
        let endpoint = match &token {
            Some(token) => format!("{}/bot{}", base_url, token.expose_secret()),
            None => base_url.to_string(),
        };
        let timeout = Duration::from_secs(settings.poll_timeout_secs + 10);

        Ok(Self {
            http: HttpClient::with_timeout(SERVICE, &endpoint, timeout)?,
            configured: token.is_some(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    fn check<T>(&self, response: BotResponse<T>) -> Result<Option<T>, BotError> {
        if response.ok {
            Ok(response.result)
        } else {
            Err(BotError::remote(
                SERVICE,
                response
                    .description
                    .unwrap_or_else(|| "request rejected".to_string()),
            ))
        }
    }
}

/// Cut a message to the transport limit on a char boundary
pub fn fit_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    cut.push('…');
    cut
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        if !self.configured {
            return Err(BotError::Config("Chat bot token not configured".to_string()));
        }

        let request = SendMessageRequest {
            chat_id,
            text: fit_message(text),
            disable_web_page_preview: Some(true),
        };
        let response: BotResponse<serde_json::Value> =
            self.http.post("/sendMessage", &request).await?;
        self.check(response).map(|_| ())
    }

    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<ChatUpdate>, BotError> {
        if !self.configured {
            return Err(BotError::Config("Chat bot token not configured".to_string()));
        }

        let offset = offset.to_string();
        let timeout = timeout_secs.to_string();
        let response: BotResponse<Vec<Update>> = self
            .http
            .get("/getUpdates", &[("offset", &offset), ("timeout", &timeout)])
            .await?;

        let updates = self.check(response)?.unwrap_or_default();
        Ok(updates
            .into_iter()
            .map(|update| {
                let (chat_id, text) = match update.message {
                    Some(message) => (message.chat.id, message.text.unwrap_or_default()),
                    None => (0, String::new()),
                };
                ChatUpdate {
                    update_id: update.update_id,
                    chat_id,
                    text,
                }
            })
            .collect())
    }
}
