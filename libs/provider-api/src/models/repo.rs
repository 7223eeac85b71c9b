//! Source-repo host models

use serde::{Deserialize, Serialize};

/// Repository creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepoRequest {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

/// Repository owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// Repository response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoResponse {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    pub owner: RepoOwner,
}

/// File upload request; `content` is base64
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentRequest {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentInfo {
    pub path: String,
    pub sha: String,
}

/// File upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentResponse {
    #[serde(default)]
    pub content: Option<ContentInfo>,
}
