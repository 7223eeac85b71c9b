//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bot_api::models::{
    BatchRequest, BatchResponse, DeploymentListResponse, ErrorResponse, HealthResponse,
    InFlightTarget, ProcessRequest, ResultsQuery, SearchRequest, StatusResponse, VersionResponse,
};
use tracing::error;

use crate::cache::results::ResultsFilter;
use crate::errors::BotError;
use crate::models::practice::DiscoveryQuery;
use crate::models::report::WorkflowStatus;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Most URLs accepted by one batch request
pub const MAX_BATCH_URLS: usize = 50;

/// Error rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        let status = match &err {
            BotError::InvalidTarget(_) | BotError::Validation(_) | BotError::Config(_) => {
                StatusCode::BAD_REQUEST
            }
            BotError::RemoteCall { .. } | BotError::Timeout { .. } | BotError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "leadbot".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Current phase and in-flight workflows
pub async fn status_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let runner = &state.runner;
    let in_flight = runner
        .in_flight()
        .into_iter()
        .map(|entry| InFlightTarget {
            workflow_id: entry.workflow_id,
            url: entry.url,
            phase: entry.phase.to_string(),
            entered_at: entry.entered_at,
        })
        .collect();

    Json(StatusResponse {
        current_phase: runner.current_phase(),
        in_flight,
        total_processed: runner.total_results(),
        results_capacity: runner.results_capacity(),
        concurrency_limit: runner.concurrency_limit(),
    })
}

/// Process one URL
pub async fn process_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.runner.process_url(&request.url).await?;
    Ok(Json(report))
}

/// Process many URLs
pub async fn batch_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<BatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.urls.is_empty() {
        return Err(ApiError::bad_request("urls must not be empty"));
    }
    if request.urls.len() > MAX_BATCH_URLS {
        return Err(ApiError::bad_request(format!(
            "at most {} urls per batch",
            MAX_BATCH_URLS
        )));
    }

    let outcomes = state.runner.process_batch(request.urls).await;
    batch_response(&outcomes)
}

/// Discover and process practices
pub async fn search_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let practice_type = request.practice_type.trim();
    if practice_type.is_empty() {
        return Err(ApiError::bad_request("practice_type must not be empty"));
    }

    let mut query = DiscoveryQuery::new(practice_type, request.location);
    if let Some(limit) = request.limit {
        query.limit = limit.clamp(1, MAX_BATCH_URLS);
    }

    let outcomes = state.runner.process_search(query).await?;
    batch_response(&outcomes)
}

fn batch_response(
    outcomes: &[crate::models::report::BatchOutcome],
) -> Result<Json<BatchResponse>, ApiError> {
    let reported = outcomes.iter().filter(|o| o.report().is_some()).count();
    let values = outcomes
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            error!("Failed to serialize batch outcomes: {}", e);
            ApiError::from(BotError::Json(e))
        })?;

    Ok(Json(BatchResponse {
        total: outcomes.len(),
        reported,
        failed: outcomes.len() - reported,
        outcomes: values,
    }))
}

/// Logged reports, newest first
pub async fn results_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ResultsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<WorkflowStatus>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let filter = ResultsFilter {
        status,
        url_contains: query.url.filter(|u| !u.trim().is_empty()),
        since: None,
        limit: query.limit,
    };
    Ok(Json(state.runner.results(&filter)))
}

/// Deployed demos, newest first
pub async fn deployments_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let deployments = state.runner.deployments();
    let total = deployments.len();
    Json(DeploymentListResponse { deployments, total })
}

/// Configuration snapshot
pub async fn diagnostics_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(state.diagnostics.clone())
}

/// Aggregate statistics
pub async fn analytics_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(state.runner.analytics())
}
