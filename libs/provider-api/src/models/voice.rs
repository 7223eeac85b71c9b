//! Voice-agent provider models

use serde::{Deserialize, Serialize};

/// Assistant creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    pub name: String,
    pub first_message: String,
    pub model: AssistantModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<AssistantVoice>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Language model driving the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantModel {
    pub provider: String,
    pub model: String,
    pub messages: Vec<ModelMessage>,
}

/// Prompt message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: String,
    pub content: String,
}

/// Speech synthesis voice
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantVoice {
    pub provider: String,
    pub voice_id: String,
}

/// Assistant response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
