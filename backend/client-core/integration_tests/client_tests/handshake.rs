use crate::client_tests::helpers::{
    TEST_PASSWORD, TEST_USERNAME, WAIT, refused_url, start_test_server, test_config,
};

use client_core::error::ws::WsError;
use client_core::{ConnectionState, ConsoleClient};

use std::time::Duration;

use models::ServerFrame;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// **VALUE**: Verifies the first frame is `authenticate` with a Basic token.
///
/// **WHY THIS MATTERS**: The backend closes any socket whose first frame is
/// not a valid handshake.
///
/// **BUG THIS CATCHES**: Would catch a queued request overtaking the
/// handshake, or a malformed token.
#[tokio::test]
async fn given_credentials_when_connect_with_auth_then_handshake_is_first_frame() {
    // GIVEN: A client with one request queued before connecting
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    client.listen_tasks().unwrap();

    // WHEN: Connecting with credentials
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await })
    };
    let mut conn = server.next_connection().await;

    // THEN: The handshake comes first, and the queued request only after success
    let token = conn.accept_auth().await;
    assert_eq!(token, "Basic YWRtaW46c2VjcmV0");
    assert_eq!(conn.recv_json().await, json!({"action": "task_listen"}));
    connecting.await.unwrap().unwrap();
    assert_eq!(client.state(), ConnectionState::Connected);
}

/// **VALUE**: Verifies nothing reaches subscribers before authentication succeeds.
///
/// **WHY THIS MATTERS**: A misbehaving backend must not leak data into views
/// before the operator is authenticated.
///
/// **BUG THIS CATCHES**: Would catch frames dispatched while Authenticating.
#[tokio::test]
async fn given_frames_before_auth_response_when_dispatching_then_dropped() {
    // GIVEN: A subscriber on config changes
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();
    let _sub = client.subscribe("config_update", move |frame| {
        let _ = tx.send(frame.clone());
    });

    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await })
    };
    let mut conn = server.next_connection().await;
    conn.expect_authenticate().await;

    // WHEN: A push arrives before the handshake answer, then one after
    conn.send_json(json!({"action": "config_update", "success": true, "config_data": "early"}))
        .await;
    conn.send_json(json!({"action": "authenticate_response", "success": true}))
        .await;
    conn.send_json(json!({"action": "config_update", "success": true, "config_data": "late"}))
        .await;
    connecting.await.unwrap().unwrap();

    // THEN: Only the post-auth frame is delivered
    let delivered = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivered.config_data, json!("late"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

/// **VALUE**: Verifies a rejection surfaces the server's message.
///
/// **WHY THIS MATTERS**: The login form shows this text to the operator.
///
/// **BUG THIS CATCHES**: Would catch a rejected handshake reported as a
/// transport error or a hanging connect call.
#[tokio::test]
async fn given_rejected_credentials_when_connect_with_auth_then_auth_error_with_message() {
    // GIVEN: A server that rejects the handshake
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, "wrong").await })
    };

    // WHEN: Rejected
    let mut conn = server.next_connection().await;
    conn.reject_auth("invalid username or password").await;

    // THEN: Auth error carrying the message
    match connecting.await.unwrap() {
        Err(WsError::Auth { message, .. }) => {
            assert_eq!(message, "invalid username or password")
        }
        other => panic!("Expected Auth error, got {other:?}"),
    }

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies rejected credentials are retried unchanged.
///
/// **WHY THIS MATTERS**: A backend that briefly rejects logins (for example
/// while reloading its user table) recovers without operator action.
///
/// **BUG THIS CATCHES**: Would catch credentials being cleared on rejection.
#[tokio::test]
async fn given_auth_failure_when_reconnecting_then_same_credentials_sent() {
    // GIVEN: The first handshake is rejected
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await })
    };
    let mut first = server.next_connection().await;
    let first_token = first.expect_authenticate().await;
    first
        .send_json(json!({"action": "authenticate_response", "success": false, "message": "busy"}))
        .await;
    assert!(connecting.await.unwrap().is_err());

    // WHEN: The client reconnects on its own
    let mut second = server.next_connection().await;

    // THEN: The same token is offered, and acceptance connects
    let second_token = second.accept_auth().await;
    assert_eq!(first_token, second_token);
    let mut states = client.watch_state();
    timeout(WAIT, states.wait_for(ConnectionState::is_connected))
        .await
        .unwrap()
        .unwrap();

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_retry_disabled_when_auth_rejected_then_no_reconnect() {
    let mut server = start_test_server().await;
    let mut config = test_config(&server.url);
    config.reconnect.retry_after_auth_failure = false;
    let client = ConsoleClient::new(config);
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, "wrong").await })
    };

    let mut conn = server.next_connection().await;
    conn.reject_auth("denied").await;

    assert!(matches!(
        connecting.await.unwrap(),
        Err(WsError::Auth { .. })
    ));
    server.expect_no_connection(Duration::from_millis(300)).await;
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn given_silent_server_when_handshake_times_out_then_timeout_error() {
    let mut server = start_test_server().await;
    let mut config = test_config(&server.url);
    config.connection.handshake_timeout_ms = 100;
    let client = ConsoleClient::new(config);
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await })
    };

    let mut conn = server.next_connection().await;
    conn.expect_authenticate().await;

    assert!(matches!(
        connecting.await.unwrap(),
        Err(WsError::Timeout { .. })
    ));

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_refused_server_when_connect_with_auth_then_connect_error() {
    let url = refused_url().await;
    let client = ConsoleClient::new(test_config(&url));

    let result = client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await;

    assert!(matches!(result, Err(WsError::Connect { .. })));
    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies the authenticated path stops retrying after its cap.
///
/// **BUG THIS CATCHES**: Would catch an unbounded retry loop against a
/// backend that is gone.
#[tokio::test]
async fn given_auth_attempt_cap_when_server_unreachable_then_gives_up() {
    // GIVEN: A cap of two retries with tiny delays
    let url = refused_url().await;
    let mut config = test_config(&url);
    config.reconnect.delays_ms = vec![20];
    config.reconnect.max_auth_attempts = 2;
    let client = ConsoleClient::new(config);

    // WHEN: The first attempt fails and retries run out
    assert!(client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await.is_err());
    tokio::time::sleep(Duration::from_millis(400)).await;

    // THEN: Settled in Disconnected with nothing scheduled
    assert_eq!(client.state(), ConnectionState::Disconnected);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

/// **VALUE**: Verifies disconnect cancels a pending authentication.
///
/// **BUG THIS CATCHES**: Would catch a connect call that never resolves
/// after the operator gives up.
#[tokio::test]
async fn given_pending_handshake_when_disconnect_then_connect_fails_with_disconnected() {
    // GIVEN: A handshake the server never answers
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await })
    };
    let mut conn = server.next_connection().await;
    conn.expect_authenticate().await;

    // WHEN: Disconnecting
    client.disconnect().await.unwrap();

    // THEN: The pending call fails with Disconnected
    assert!(matches!(
        connecting.await.unwrap(),
        Err(WsError::Disconnected { .. })
    ));
    assert_eq!(client.state(), ConnectionState::Idle);
}
