//! Batch, search and notification tests for the workflow runner

use std::sync::Arc;
use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use leadbot::errors::BotError;
use leadbot::models::practice::DiscoveryQuery;
use leadbot::models::report::BatchOutcome;
use leadbot::workflow::batch::BatchLimiter;
use leadbot::workflow::runner::WorkflowRunner;

use crate::common::{
    collaborators, controller, healthy_controller, runner, FakeChat, FakeDiscoverer, FakeLeads,
    FakeScraper, FakeStrategy, FakeVoice,
};

#[tokio::test(start_paused = true)]
async fn test_batch_never_exceeds_concurrency_limit() {
    let scraper = Arc::new(FakeScraper::ok().with_delay(Duration::from_millis(200)));
    let controller = controller(collaborators(
        scraper.clone(),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ));
    let runner = runner(controller, 3);

    let urls: Vec<String> = (0..7).map(|i| format!("https://site{}.com", i)).collect();
    let outcomes = runner.process_batch(urls.clone()).await;

    assert_eq!(outcomes.len(), 7);
    assert_eq!(scraper.gauge.peak(), 3);
    assert_eq!(runner.total_results(), 7);
    let order: Vec<&str> = outcomes.iter().map(|o| o.target_url()).collect();
    assert_eq!(order, urls.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_batch_preserves_submission_order() {
    let runner = runner(healthy_controller(), 3);
    let urls = vec![
        "c.com".to_string(),
        "a.com".to_string(),
        "b.com".to_string(),
        "d.com".to_string(),
    ];

    let outcomes = runner.process_batch(urls).await;
    let order: Vec<&str> = outcomes.iter().map(|o| o.target_url()).collect();
    assert_eq!(
        order,
        vec!["https://c.com", "https://a.com", "https://b.com", "https://d.com"]
    );
}

#[tokio::test]
async fn test_invalid_url_fails_alone() {
    let runner = runner(healthy_controller(), 2);
    let outcomes = runner
        .process_batch(vec!["https://a.com".to_string(), "   ".to_string()])
        .await;

    assert!(outcomes[0].report().is_some());
    match &outcomes[1] {
        BatchOutcome::Failed { error, .. } => assert!(error.contains("Invalid target")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_process_url_rejects_empty() {
    let runner = runner(healthy_controller(), 1);
    let err = assert_err!(runner.process_url("").await);
    assert!(matches!(err, BotError::InvalidTarget(_)));
    assert_eq!(runner.total_results(), 0);
}

#[tokio::test]
async fn test_search_without_discoverer_is_config_error() {
    let runner = runner(healthy_controller(), 1);
    let err = runner
        .process_search(DiscoveryQuery::new("dentist", None))
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Config(_)));
}

#[tokio::test]
async fn test_search_dedupes_limits_and_classifies() {
    let discoverer = Arc::new(FakeDiscoverer::new(&[
        "https://a.com",
        "https://A.com ",
        " ",
        "https://b.com",
        "https://c.com",
    ]));
    let runner = WorkflowRunner::builder(healthy_controller(), BatchLimiter::new(2, Duration::ZERO))
        .with_discoverer(discoverer.clone())
        .build();
    assert!(runner.has_discoverer());

    let mut query = DiscoveryQuery::new("dentist", Some("Austin".to_string()));
    query.limit = 2;
    let outcomes = assert_ok!(runner.process_search(query).await);

    let urls: Vec<&str> = outcomes.iter().map(|o| o.target_url()).collect();
    assert_eq!(urls, vec!["https://a.com", "https://b.com"]);

    let report = outcomes[0].report().unwrap();
    assert_eq!(report.target.practice_type.as_deref(), Some("dentist"));
    assert_eq!(report.target.location.as_deref(), Some("Austin"));
    assert_eq!(discoverer.queries.lock().unwrap()[0].query_text(), "dentist in Austin");
}

#[tokio::test]
async fn test_finished_reports_are_sent_to_admin_chat() {
    let chat = Arc::new(FakeChat::default());
    let runner = WorkflowRunner::builder(healthy_controller(), BatchLimiter::new(1, Duration::ZERO))
        .with_notifier(chat.clone(), 42)
        .build();

    let report = runner.process_url("https://acme.com").await.unwrap();

    let sent = chat.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 42);
    assert!(sent[0].1.contains(report.practice_name()));
}

#[tokio::test]
async fn test_analytics_and_deployments_follow_results() {
    let runner = runner(healthy_controller(), 2);
    runner
        .process_batch(vec!["https://a.com".to_string(), "https://b.com".to_string()])
        .await;

    let analytics = runner.analytics();
    assert_eq!(analytics.total, 2);
    assert_eq!(analytics.complete, 2);
    assert_eq!(analytics.methods.get("full-remote-deploy"), Some(&2));

    let deployments = runner.deployments();
    assert_eq!(deployments.len(), 2);
    assert_eq!(deployments[0].url, "https://demo.example.app");
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_workflow_returns_tracker_to_idle() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok().with_delay(Duration::from_secs(10))),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ));
    let runner = runner(controller, 1);

    let abandoned =
        tokio::time::timeout(Duration::from_secs(1), runner.process_url("https://a.com")).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(runner.current_phase(), "idle");
    assert!(runner.in_flight().is_empty());
    assert_eq!(runner.total_results(), 0);
}

#[tokio::test]
async fn test_slugs_are_unique_within_a_batch() {
    let runner = runner(healthy_controller(), 3);
    let outcomes = runner
        .process_batch(vec![
            "https://acme.com/".to_string(),
            "https://acme.com/a".to_string(),
            "https://acme.com/b".to_string(),
        ])
        .await;

    let slugs: std::collections::HashSet<String> = outcomes
        .iter()
        .map(|o| o.report().unwrap().scrape.payload.slug.clone())
        .collect();
    assert_eq!(slugs.len(), 3);
}
