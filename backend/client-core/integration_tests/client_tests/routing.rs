use crate::client_tests::helpers::{WAIT, start_test_server, test_config};

use client_core::{ConsoleClient, Subscription};

use std::time::Duration;

use models::{Notice, ServerFrame, TaskStatus};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn forward(
    client: &ConsoleClient,
    discriminator: &str,
    label: &'static str,
    tx: &mpsc::UnboundedSender<(&'static str, ServerFrame)>,
) -> Subscription {
    let tx = tx.clone();
    client.subscribe(discriminator, move |frame| {
        let _ = tx.send((label, frame.clone()));
    })
}

/// **VALUE**: Verifies a config change push reaches every subscriber once.
///
/// **WHY THIS MATTERS**: The tree and the detail card both refresh on the
/// same push.
///
/// **BUG THIS CATCHES**: Would catch a handler invoked twice, skipped, or
/// called out of registration order.
#[tokio::test]
async fn given_two_subscribers_when_config_update_pushed_then_each_invoked_once_in_order() {
    // GIVEN: Two subscribers on config changes
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _tree = forward(&client, "config_update", "tree", &tx);
    let _card = forward(&client, "config_update", "card", &tx);
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;

    // WHEN: The server pushes one change
    conn.send_json(json!({
        "action": "config_update",
        "config_type": "db_config",
        "success": true,
        "config_data": [{"id": 1}]
    }))
    .await;

    // THEN: Both handlers ran once, in order, with the whole frame
    let (first, frame) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let (second, _) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!((first, second), ("tree", "card"));
    assert_eq!(frame.config_type.as_deref(), Some("db_config"));
    assert_eq!(frame.config_data, json!([{"id": 1}]));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies legacy pushes reach the same subscribers with typed payloads.
///
/// **WHY THIS MATTERS**: The task monitor receives `{type, data}` pushes
/// from older backends.
///
/// **BUG THIS CATCHES**: Would catch legacy frames being dropped or their
/// `data` not becoming `config_data`.
#[tokio::test]
async fn given_legacy_and_modern_task_pushes_when_dispatched_then_same_payload() {
    // GIVEN: A task subscriber
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _tasks = forward(&client, "task_listen", "tasks", &tx);
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;
    let statuses = json!([{
        "UUID": "7f1c",
        "TaskName": "nightly-check",
        "NextStart": "2024-05-02T01:00:00Z",
        "LastStart": "0001-01-01T00:00:00Z"
    }]);

    // WHEN: The same status arrives in both shapes
    conn.send_json(json!({"type": "task_listen", "data": statuses.clone(), "timestamp": 1}))
        .await;
    conn.send_json(json!({"action": "task_listen", "success": true, "config_data": statuses}))
        .await;

    // THEN: Both decode to the same tasks
    let (_, legacy) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let (_, modern) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let legacy_tasks: Vec<TaskStatus> = legacy.data_as().unwrap();
    let modern_tasks: Vec<TaskStatus> = modern.data_as().unwrap();
    assert_eq!(legacy_tasks, modern_tasks);
    assert_eq!(legacy_tasks[0].task_name, "nightly-check");
    assert_eq!(legacy_tasks[0].last_start(), None);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_config_get_meta_when_answered_then_routed_to_config_meta() {
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _meta = forward(&client, "ConfigMeta", "meta", &tx);
    let _get = forward(&client, "config_get", "plain", &tx);
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;

    conn.send_json(json!({
        "action": "config_get",
        "config_type": "Meta",
        "success": true,
        "config_data": {"DB": {"fields": []}}
    }))
    .await;

    let (label, _) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(label, "meta");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies malformed frames are dropped without killing the connection.
///
/// **BUG THIS CATCHES**: Would catch a decode error tearing down the socket
/// or stopping the connection task.
#[tokio::test]
async fn given_malformed_frame_when_received_then_later_frames_still_dispatched() {
    // GIVEN: A notice subscriber
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _notices = forward(&client, "notice_get", "notices", &tx);
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;

    // WHEN: Garbage, an unroutable frame, then a real answer
    conn.send_json(json!("not an object")).await;
    conn.send_json(json!({"success": true})).await;
    conn.send_json(json!({
        "action": "notice_get",
        "success": true,
        "config_data": [{"ID": 1, "Content": "disk 91%", "Time": "t", "ConfirmStat": "Unread"}]
    }))
    .await;

    // THEN: The answer is delivered
    let (_, frame) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let notices: Vec<Notice> = frame.data_as().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(client.state().is_connected());

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_cancelled_subscription_when_frame_pushed_then_other_handler_still_runs() {
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let first = forward(&client, "notice_confirm", "first", &tx);
    let _second = forward(&client, "notice_confirm", "second", &tx);
    assert!(first.cancel());
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;

    conn.send_json(json!({"action": "notice_confirm", "success": true}))
        .await;

    let (label, _) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(label, "second");
    client.disconnect().await.unwrap();
}
