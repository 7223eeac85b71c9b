//! Results log tests

use chrono::{Duration as ChronoDuration, Utc};

use leadbot::cache::results::{ResultsFilter, ResultsLog};
use leadbot::models::practice::Target;
use leadbot::models::report::{WorkflowReport, WorkflowStatus};

use crate::common::healthy_controller;

async fn reports(urls: &[&str]) -> Vec<WorkflowReport> {
    let controller = healthy_controller();
    let mut out = Vec::new();
    for url in urls {
        out.push(controller.process_target(Target::new(url).unwrap()).await);
    }
    out
}

#[tokio::test]
async fn test_oldest_report_is_evicted() {
    let log = ResultsLog::new(2);
    for report in reports(&["https://a.com", "https://b.com", "https://c.com"]).await {
        log.push(report);
    }

    assert_eq!(log.len(), 2);
    let urls: Vec<String> = log.snapshot().into_iter().map(|r| r.target.url).collect();
    assert_eq!(urls, vec!["https://b.com", "https://c.com"]);
}

#[test]
fn test_zero_capacity_keeps_one() {
    let log = ResultsLog::new(0);
    assert_eq!(log.capacity(), 1);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_query_filters_newest_first() {
    let log = ResultsLog::default();
    let mut all = reports(&[
        "https://smiles-austin.com",
        "https://spine.com",
        "https://smiles-dallas.com",
    ])
    .await;
    all[1].workflow_status = WorkflowStatus::Failed;
    for report in all {
        log.push(report);
    }

    let smiles = log.query(&ResultsFilter {
        url_contains: Some("SMILES".to_string()),
        ..Default::default()
    });
    let urls: Vec<&str> = smiles.iter().map(|r| r.target.url.as_str()).collect();
    assert_eq!(urls, vec!["https://smiles-dallas.com", "https://smiles-austin.com"]);

    let failed = log.query(&ResultsFilter {
        status: Some(WorkflowStatus::Failed),
        ..Default::default()
    });
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].target.url, "https://spine.com");

    let limited = log.query(&ResultsFilter {
        limit: Some(1),
        ..Default::default()
    });
    assert_eq!(limited[0].target.url, "https://smiles-dallas.com");
}

#[tokio::test]
async fn test_query_since() {
    let log = ResultsLog::default();
    let mut all = reports(&["https://old.com", "https://new.com"]).await;
    all[0].finished_at = Utc::now() - ChronoDuration::hours(2);
    for report in all {
        log.push(report);
    }

    let recent = log.query(&ResultsFilter {
        since: Some(Utc::now() - ChronoDuration::hours(1)),
        ..Default::default()
    });
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].target.url, "https://new.com");
}
