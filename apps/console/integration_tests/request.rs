use inspector_console::commands::request;
use inspector_console::error::ConsoleError;

use client_core::ConsoleClient;
use client_core::config::ClientConfig;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Backend that accepts one socket, acknowledges `authenticate`, and answers
/// `task_do` with `reply`.
async fn start_backend(reply: Value) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let frame: Value = serde_json::from_str(text.as_str()).unwrap();
            let answer = match frame["action"].as_str() {
                Some("authenticate") => json!({"action": "authenticate_response", "success": true}),
                Some("task_do") => reply.clone(),
                _ => continue,
            };
            ws.send(Message::text(answer.to_string())).await.unwrap();
        }
    });

    format!("ws://127.0.0.1:{port}")
}

async fn connected_client(url: &str) -> ConsoleClient {
    let mut config = ClientConfig::default();
    config.connection.url = url.to_string();
    let client = ConsoleClient::new(config);
    client.connect_with_auth("admin", "secret").await.unwrap();
    client
}

/// **VALUE**: Verifies a subcommand request resolves with the matching answer.
///
/// **WHY THIS MATTERS**: Every networked subcommand is built on this
/// request/await step.
///
/// **BUG THIS CATCHES**: Would catch the one-shot subscription missing the
/// answer or leaking after completion.
#[tokio::test]
async fn given_backend_answers_when_request_then_returns_frame_and_unsubscribes() {
    // GIVEN: An authenticated session with a backend that accepts task_do
    let url = start_backend(json!({
        "action": "task_do",
        "success": true,
        "message": "started",
        "config_data": "nightly-check"
    }))
    .await;
    let client = connected_client(&url).await;

    // WHEN: Requesting a task run
    let frame = request(
        &client,
        "task_do",
        |c| c.run_task("nightly-check"),
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    // THEN: The answer is returned and the waiter removed
    assert_eq!(frame.message.as_deref(), Some("started"));
    assert_eq!(client.router().handler_count("task_do"), 0);

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies a `success = false` answer becomes a server error.
///
/// **BUG THIS CATCHES**: Would catch failed answers printed as successes.
#[tokio::test]
async fn given_backend_rejects_when_request_then_server_error() {
    // GIVEN: A backend that fails task_do
    let url = start_backend(json!({
        "action": "task_do",
        "success": false,
        "message": "task not found"
    }))
    .await;
    let client = connected_client(&url).await;

    // WHEN: Requesting
    let result = request(
        &client,
        "task_do",
        |c| c.run_task("missing"),
        Duration::from_secs(5),
    )
    .await;

    // THEN: Server error with the backend's text
    match result {
        Err(ConsoleError::Server { message, .. }) => assert_eq!(message, "task not found"),
        other => panic!("Expected Server error, got {other:?}"),
    }

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_silent_backend_when_request_then_timeout() {
    let url = start_backend(json!({"action": "something_else", "success": true})).await;
    let client = connected_client(&url).await;

    let result = request(
        &client,
        "notice_get",
        |c| c.get_notices(1, 20),
        Duration::from_millis(200),
    )
    .await;

    assert!(matches!(result, Err(ConsoleError::Timeout { .. })));
    client.disconnect().await.unwrap();
}
