use crate::client_tests::helpers::{
    ServerConnection, TEST_PASSWORD, TEST_USERNAME, TestServer, start_test_server, test_config,
};

use client_core::ConsoleClient;
use client_core::error::ws::WsError;

use serde_json::json;

async fn authenticated_client() -> (TestServer, ConsoleClient, ServerConnection) {
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_auth(TEST_USERNAME, TEST_PASSWORD).await })
    };
    let mut conn = server.next_connection().await;
    conn.accept_auth().await;
    connecting.await.unwrap().unwrap();
    (server, client, conn)
}

/// **VALUE**: Verifies a successful password change is used on the next reconnect.
///
/// **WHY THIS MATTERS**: After rotation the old password no longer works; a
/// reconnect with stale credentials would lock the operator out.
///
/// **BUG THIS CATCHES**: Would catch the retained credentials not being
/// updated, or the wrong envelope being sent.
#[tokio::test]
async fn given_accepted_change_when_reconnecting_then_new_password_used() {
    // GIVEN: An authenticated session
    let (mut server, client, mut conn) = authenticated_client().await;

    // WHEN: The password is changed and the server accepts
    let changing = {
        let client = client.clone();
        tokio::spawn(async move { client.change_password(TEST_PASSWORD, "n3w").await })
    };
    let request = conn.recv_json().await;
    assert_eq!(
        request,
        json!({
            "action": "change_password",
            "config_type": "auth",
            "old_password": TEST_PASSWORD,
            "new_password": "n3w"
        })
    );
    conn.send_json(json!({"action": "change_password_response", "success": true}))
        .await;
    changing.await.unwrap().unwrap();

    // THEN: After a drop, the reconnect authenticates with the new password
    drop(conn);
    let mut reconnected = server.next_connection().await;
    let token = reconnected.expect_authenticate().await;
    assert_eq!(token, "Basic YWRtaW46bjN3");

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_rejected_change_when_change_password_then_auth_error() {
    let (_server, client, mut conn) = authenticated_client().await;
    let changing = {
        let client = client.clone();
        tokio::spawn(async move { client.change_password("bad-old", "n3w").await })
    };

    conn.recv_json().await;
    conn.send_json(json!({
        "action": "change_password_response",
        "success": false,
        "message": "old password mismatch"
    }))
    .await;

    match changing.await.unwrap() {
        Err(WsError::Auth { message, .. }) => assert_eq!(message, "old password mismatch"),
        other => panic!("Expected Auth error, got {other:?}"),
    }
    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies only one password change can be pending.
///
/// **WHY THIS MATTERS**: Answers carry no correlation id; two in flight would
/// resolve against each other's answer.
///
/// **BUG THIS CATCHES**: Would catch a second request overwriting the first
/// waiter.
#[tokio::test]
async fn given_change_in_flight_when_change_password_again_then_rejected() {
    // GIVEN: One change waiting for the server
    let (_server, client, mut conn) = authenticated_client().await;
    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.change_password(TEST_PASSWORD, "n3w").await })
    };
    conn.recv_json().await;

    // WHEN: A second change is requested
    let second = client.change_password(TEST_PASSWORD, "other").await;

    // THEN: Rejected immediately, and the first still completes
    assert!(matches!(second, Err(WsError::PasswordChangeInFlight { .. })));
    conn.send_json(json!({"action": "change_password_response", "success": true}))
        .await;
    first.await.unwrap().unwrap();

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn given_no_connection_when_change_password_then_not_connected() {
    let client = ConsoleClient::new(test_config("ws://127.0.0.1:1"));

    let result = client.change_password("a", "b").await;

    assert!(matches!(result, Err(WsError::NotConnected { .. })));
}

#[tokio::test]
async fn given_connection_drops_when_change_pending_then_transport_error() {
    let (_server, client, mut conn) = authenticated_client().await;
    let changing = {
        let client = client.clone();
        tokio::spawn(async move { client.change_password(TEST_PASSWORD, "n3w").await })
    };
    conn.recv_json().await;

    drop(conn);

    assert!(matches!(
        changing.await.unwrap(),
        Err(WsError::Transport { .. })
    ));
    client.disconnect().await.unwrap();
}
