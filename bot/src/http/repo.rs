//! Source-repo host client

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use provider_api::models::repo::{CreateRepoRequest, PutContentRequest, PutContentResponse, RepoResponse};
use secrecy::SecretString;
use tracing::debug;

use crate::errors::BotError;
use crate::http::client::HttpClient;
use crate::models::deployment::FileSet;
use crate::providers::{RepoHost, RepoRef};
use crate::storage::settings::RepoHostSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
const SERVICE: &str = "repo host";

pub struct RepoHostClient {
    http: HttpClient,
    /// Organization that owns created repositories; the token's user when unset
    owner: Option<String>,
    configured: bool,
}

impl RepoHostClient {
    pub fn new(settings: &RepoHostSettings) -> Result<Self, BotError> {
        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut http = HttpClient::new(SERVICE, base_url)?
            .with_header("Accept", "application/vnd.github+json")?
            .with_header("X-GitHub-Api-Version", "2022-11-28")?;
        let configured = settings.token.is_some();
        if let Some(token) = settings.token.clone() {
            http = http.with_bearer(SecretString::from(token));
        }
        Ok(Self {
            http,
            owner: settings.owner.clone().filter(|o| !o.trim().is_empty()),
            configured,
        })
    }

    fn create_path(&self) -> String {
        match &self.owner {
            Some(owner) => format!("/orgs/{}/repos", owner),
            None => "/user/repos".to_string(),
        }
    }
}

#[async_trait]
impl RepoHost for RepoHostClient {
    async fn create_repo(&self, name: &str, files: &FileSet) -> Result<RepoRef, BotError> {
        if !self.configured {
            return Err(BotError::Config("Repo host token not configured".to_string()));
        }

        let request = CreateRepoRequest {
            name: name.to_string(),
            description: format!("Demo site for {}", name),
            private: false,
            auto_init: true,
        };
        let created: RepoResponse = self.http.post(&self.create_path(), &request).await?;

        if created.full_name.trim().is_empty() || created.owner.login.trim().is_empty() {
            return Err(BotError::Validation(
                "Repo host returned a repository without name".to_string(),
            ));
        }

        let repo = RepoRef {
            owner: created.owner.login,
            name: created.name,
            html_url: created.html_url,
            default_branch: created.default_branch.unwrap_or_else(|| "main".to_string()),
        };

        for file in files {
            let upload = PutContentRequest {
                message: format!("Add {}", file.path),
                content: BASE64.encode(file.content.as_bytes()),
                branch: Some(repo.default_branch.clone()),
            };
            let path = format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, file.path);
            let _: PutContentResponse = self.http.put(&path, &upload).await?;
            debug!("Uploaded {} to {}", file.path, repo.full_name());
        }

        Ok(repo)
    }
}
