//! HTTP API tests

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use leadbot::server::serve::router;
use leadbot::server::state::ServerState;
use leadbot::storage::settings::Settings;
use leadbot::utils::collect_diagnostics;

use crate::common::{healthy_controller, runner};

fn app() -> Router {
    let diagnostics = collect_diagnostics(&Settings::default(), vec!["full-remote-deploy".to_string()]);
    router(Arc::new(ServerState::new(runner(healthy_controller(), 2), diagnostics)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_process_then_results_and_status() {
    let app = app();

    let (status, report) = send(&app, post("/process", json!({"url": "brightsmiles.com"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["workflow_status"], "complete");
    assert_eq!(report["target"]["url"], "https://brightsmiles.com");

    let (status, results) = send(&app, get("/results?status=complete&limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 1);

    let (_, state) = send(&app, get("/status")).await;
    assert_eq!(state["current_phase"], "idle");
    assert_eq!(state["total_processed"], 1);
    assert_eq!(state["concurrency_limit"], 2);
}

#[tokio::test]
async fn test_process_empty_url_is_bad_request() {
    let (status, body) = send(&app(), post("/process", json!({"url": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid target"));
}

#[tokio::test]
async fn test_batch_validation_and_outcomes() {
    let app = app();

    let (status, _) = send(&app, post("/batch", json!({"urls": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post("/batch", json!({"urls": ["https://a.com", "", "https://b.com"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["reported"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["outcomes"][1]["outcome"], "failed");
}

#[tokio::test]
async fn test_search_without_discovery_provider() {
    let (status, _) = send(&app(), post("/search", json!({"practice_type": "dentist"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app(), post("/search", json!({"practice_type": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_results_status_is_rejected() {
    let (status, _) = send(&app(), get("/results?status=sideways")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deployments_analytics_and_diagnostics() {
    let app = app();
    send(&app, post("/process", json!({"url": "https://acme.com"}))).await;

    let (_, deployments) = send(&app, get("/deployments")).await;
    assert_eq!(deployments["total"], 1);
    assert_eq!(deployments["deployments"][0]["url"], "https://demo.example.app");

    let (_, analytics) = send(&app, get("/analytics")).await;
    assert_eq!(analytics["total"], 1);
    assert_eq!(analytics["complete"], 1);

    let (_, diagnostics) = send(&app, get("/diagnostics")).await;
    assert_eq!(diagnostics["workflow"]["strategies"][0], "full-remote-deploy");
    assert_eq!(diagnostics["chat_enabled"], false);
}
