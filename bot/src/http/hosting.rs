//! Deploy host client (GraphQL)

use async_trait::async_trait;
use provider_api::models::hosting::{
    GraphqlRequest, GraphqlResponse, ProjectCreateData, ServiceCreateData, ServiceDomainCreateData,
    PROJECT_CREATE, SERVICE_CREATE, SERVICE_DOMAIN_CREATE,
};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::errors::BotError;
use crate::http::client::HttpClient;
use crate::providers::{DeployHost, ProjectRef, ServiceRef, ServiceSource};
use crate::storage::settings::HostingSettings;

pub const DEFAULT_BASE_URL: &str = "https://backboard.railway.app";
const GRAPHQL_PATH: &str = "/graphql/v2";
const SERVICE: &str = "deploy host";

pub struct HostingClient {
    http: HttpClient,
    configured: bool,
}

impl HostingClient {
    pub fn new(settings: &HostingSettings) -> Result<Self, BotError> {
        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut http = HttpClient::new(SERVICE, base_url)?;
        let configured = settings.token.is_some();
        if let Some(token) = settings.token.clone() {
            http = http.with_bearer(SecretString::from(token));
        }
        Ok(Self { http, configured })
    }

    async fn mutate<T: DeserializeOwned>(&self, query: &str, input: Value) -> Result<T, BotError> {
        if !self.configured {
            return Err(BotError::Config("Deploy host token not configured".to_string()));
        }

        let request = GraphqlRequest {
            query: query.to_string(),
            variables: json!({ "input": input }),
        };
        let response: GraphqlResponse<T> = self.http.post(GRAPHQL_PATH, &request).await?;

        if !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(BotError::remote(SERVICE, messages.join("; ")));
        }
        response
            .data
            .ok_or_else(|| BotError::Validation("Deploy host returned no data".to_string()))
    }
}

/// Service input for a repository or image source
pub fn service_input(project: &ProjectRef, source: &ServiceSource, env: &[(String, String)]) -> Value {
    let variables: Map<String, Value> = env
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    match source {
        ServiceSource::Repo { full_name, branch } => json!({
            "projectId": project.id,
            "name": project.name,
            "source": { "repo": full_name },
            "branch": branch,
            "variables": variables,
        }),
        ServiceSource::Image { image } => json!({
            "projectId": project.id,
            "name": project.name,
            "source": { "image": image },
            "variables": variables,
        }),
    }
}

#[async_trait]
impl DeployHost for HostingClient {
    async fn create_project(&self, name: &str) -> Result<ProjectRef, BotError> {
        let data: ProjectCreateData = self.mutate(PROJECT_CREATE, json!({ "name": name })).await?;
        if data.project_create.id.trim().is_empty() {
            return Err(BotError::Validation("Deploy host returned a project without id".to_string()));
        }
        Ok(ProjectRef {
            id: data.project_create.id,
            name: if data.project_create.name.is_empty() {
                name.to_string()
            } else {
                data.project_create.name
            },
        })
    }

    async fn create_service(
        &self,
        project: &ProjectRef,
        source: ServiceSource,
        env: Vec<(String, String)>,
    ) -> Result<ServiceRef, BotError> {
        let data: ServiceCreateData = self
            .mutate(SERVICE_CREATE, service_input(project, &source, &env))
            .await?;
        if data.service_create.id.trim().is_empty() {
            return Err(BotError::Validation("Deploy host returned a service without id".to_string()));
        }
        Ok(ServiceRef {
            id: data.service_create.id,
            project_id: project.id.clone(),
        })
    }

    async fn create_domain(&self, service: &ServiceRef) -> Result<String, BotError> {
        let data: ServiceDomainCreateData = self
            .mutate(SERVICE_DOMAIN_CREATE, json!({ "serviceId": service.id }))
            .await?;
        let domain = data.service_domain_create.domain.trim().to_string();
        if domain.is_empty() {
            return Err(BotError::Validation("Deploy host returned an empty domain".to_string()));
        }
        if domain.starts_with("http://") || domain.starts_with("https://") {
            Ok(domain)
        } else {
            Ok(format!("https://{}", domain))
        }
    }
}
