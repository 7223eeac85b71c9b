//! Chat worker tests

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use leadbot::chat::commands::Command;
use leadbot::chat::format::HELP;
use leadbot::providers::ChatTransport;
use leadbot::workers::chat::{acknowledgement, execute, run, Options};

use crate::common::{healthy_controller, runner, update, FakeChat};

async fn wait_for_messages(chat: &FakeChat, count: usize) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while chat.sent().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "only got {:?}", chat.sent());
}

#[tokio::test]
async fn test_worker_replies_and_advances_offset() {
    let chat = Arc::new(FakeChat::with_polls(vec![
        Ok(vec![
            update(1, 7, "/status"),
            update(2, 7, "hello there"),
            update(3, 0, "/help"),
        ]),
        Err("502 Bad Gateway".to_string()),
        Ok(vec![update(10, 7, "/process https://acme.com")]),
    ]));
    let runner = runner(healthy_controller(), 1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let transport: Arc<dyn ChatTransport> = chat.clone();
    let worker_runner = runner.clone();
    let handle = tokio::spawn(async move {
        run(
            &Options::default(),
            worker_runner,
            transport,
            |_| std::future::ready(()),
            Box::pin(async move {
                let _ = shutdown_rx.await;
            }),
        )
        .await;
    });

    // status reply, process acknowledgement, process report
    wait_for_messages(&chat, 3).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();

    let sent = chat.sent();
    assert!(sent.iter().all(|(chat_id, _)| *chat_id == 7));
    assert!(sent.iter().any(|(_, text)| text.starts_with("Current phase:")));
    assert!(sent
        .iter()
        .any(|(_, text)| text == "Processing https://acme.com..."));
    assert!(sent
        .iter()
        .any(|(_, text)| text.contains("Practice acme.com")));
    assert!(!sent.iter().any(|(_, text)| text == HELP));

    let offsets = chat.offsets.lock().unwrap().clone();
    assert_eq!(&offsets[..3], &[0, 4, 4]);
    assert!(offsets[3..].iter().all(|offset| *offset == 11));
    assert_eq!(runner.total_results(), 1);
}

#[tokio::test]
async fn test_worker_stops_on_shutdown() {
    let chat = Arc::new(FakeChat::default());
    let transport: Arc<dyn ChatTransport> = chat.clone();
    let runner = runner(healthy_controller(), 1);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        run(
            &Options::default(),
            runner,
            transport,
            tokio::time::sleep,
            Box::pin(tokio::time::sleep(Duration::from_millis(20))),
        ),
    )
    .await;
    assert!(result.is_ok());
    assert!(chat.sent().is_empty());
}

#[tokio::test]
async fn test_execute_simple_commands() {
    let runner = runner(healthy_controller(), 1);

    assert_eq!(execute(Command::Help, &runner).await, HELP);
    assert_eq!(
        execute(Command::Usage("/process <url>"), &runner).await,
        "Usage: /process <url>"
    );
    assert!(execute(Command::Unknown("dance".to_string()), &runner)
        .await
        .contains("/dance"));
    assert!(execute(Command::Stats, &runner).await.contains("Processed: 0"));
    assert!(execute(Command::Process("  ".to_string()), &runner)
        .await
        .starts_with("Cannot process"));
}

#[test]
fn test_only_workflow_commands_are_acknowledged() {
    assert!(acknowledgement(&Command::Status).is_none());
    assert_eq!(
        acknowledgement(&Command::Batch(vec!["a.com".to_string(), "b.com".to_string()])),
        Some("Processing 2 websites...".to_string())
    );
}
