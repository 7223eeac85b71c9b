//! Deploy host GraphQL models

use serde::{Deserialize, Serialize};

/// GraphQL request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

/// GraphQL error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// Node carrying an id and a name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Node carrying an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdNode {
    pub id: String,
}

/// Domain node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainNode {
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateData {
    pub project_create: NamedNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreateData {
    pub service_create: IdNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDomainCreateData {
    pub service_domain_create: DomainNode,
}

pub const PROJECT_CREATE: &str =
    "mutation projectCreate($input: ProjectCreateInput!) { projectCreate(input: $input) { id name } }";

pub const SERVICE_CREATE: &str =
    "mutation serviceCreate($input: ServiceCreateInput!) { serviceCreate(input: $input) { id } }";

pub const SERVICE_DOMAIN_CREATE: &str =
    "mutation serviceDomainCreate($input: ServiceDomainCreateInput!) { serviceDomainCreate(input: $input) { domain } }";
