use crate::client_tests::helpers::{
    WAIT, refused_url, start_test_server, test_config,
};

use client_core::requests;
use client_core::{ConnectionState, ConsoleClient};

use std::time::Duration;

use models::{ClientMessageBuilder, ConfigType};
use serde_json::json;
use tokio::time::{Instant, timeout};

/// **VALUE**: Verifies writes issued before the socket opens go out first, in order.
///
/// **WHY THIS MATTERS**: Views fire their initial queries while the client is
/// still connecting; losing or reordering them leaves screens empty.
///
/// **BUG THIS CATCHES**: Would catch sends dropped while disconnected, a LIFO
/// drain, or a later send overtaking queued ones.
#[tokio::test]
async fn given_sends_while_disconnected_when_connection_opens_then_sent_in_order() {
    // GIVEN: A client with three queued requests
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    client.get_config(&ConfigType::Meta).unwrap();
    client.get_config_ids(&ConfigType::Db).unwrap();
    client.listen_tasks().unwrap();

    // WHEN: The connection opens, then one more send follows
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;
    client.run_task("after-open").unwrap();

    // THEN: The queued frames arrive first, in submission order
    assert_eq!(
        conn.recv_json().await,
        json!({"action": "config_get", "config_type": "Meta"})
    );
    assert_eq!(
        conn.recv_json().await,
        json!({"action": "config_get_id", "config_type": "DB"})
    );
    assert_eq!(conn.recv_json().await, json!({"action": "task_listen"}));
    assert_eq!(
        conn.recv_json().await,
        json!({"action": "task_do", "config_data": "after-open"})
    );
    assert_eq!(client.state(), ConnectionState::Connected);
}

/// **VALUE**: Verifies a refused connect is not an error and is retried.
///
/// **WHY THIS MATTERS**: The console usually starts before or alongside the
/// backend; it must keep trying instead of failing once.
///
/// **BUG THIS CATCHES**: Would catch `connect` surfacing the refused socket
/// or never scheduling a retry.
#[tokio::test]
async fn given_refused_server_when_connect_then_ok_and_reconnect_scheduled() {
    // GIVEN: Nothing listening
    let url = refused_url().await;
    let client = ConsoleClient::new(test_config(&url));
    let mut states = client.watch_state();

    // WHEN: Connecting
    let result = client.connect(&url).await;

    // THEN: No error, and a retry is scheduled
    assert!(result.is_ok());
    let scheduled = timeout(
        WAIT,
        states.wait_for(|s| matches!(s, ConnectionState::ReconnectScheduled { .. })),
    )
    .await
    .expect("reconnect was never scheduled")
    .map(|s| *s)
    .unwrap();
    assert!(matches!(
        scheduled,
        ConnectionState::ReconnectScheduled { attempt: 1, delay } if delay == Duration::from_millis(50)
    ));

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies reconnects wait at least the table delay after each drop.
///
/// **WHY THIS MATTERS**: Reconnecting in a tight loop floods a backend that
/// is restarting.
///
/// **BUG THIS CATCHES**: Would catch an immediate reconnect or a delay table
/// indexed from the wrong attempt.
#[tokio::test]
async fn given_server_drops_connection_when_reconnecting_then_waits_table_delay() {
    // GIVEN: A connected client
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    client.connect(&server.url).await.unwrap();
    let first = server.next_connection().await;

    // WHEN: The server drops the first socket
    let dropped_at = Instant::now();
    drop(first);

    // THEN: The first reconnect waits at least 50ms
    let second = server.next_connection().await;
    assert!(dropped_at.elapsed() >= Duration::from_millis(50));

    // WHEN: The reconnected socket is dropped too
    let dropped_at = Instant::now();
    drop(second);

    // THEN: The open reset the table, so it again waits the first delay
    let _third = server.next_connection().await;
    assert!(dropped_at.elapsed() >= Duration::from_millis(50));

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies consecutive failures walk further down the table.
///
/// **BUG THIS CATCHES**: Would catch the attempt counter never advancing.
#[tokio::test]
async fn given_repeated_refusals_when_reconnecting_then_delays_increase() {
    // GIVEN: Nothing listening
    let url = refused_url().await;
    let client = ConsoleClient::new(test_config(&url));
    let mut states = client.watch_state();

    // WHEN: Connecting and watching two schedules
    client.connect(&url).await.unwrap();
    let mut delays = Vec::new();
    while delays.len() < 3 {
        timeout(WAIT, states.changed())
            .await
            .expect("state never changed")
            .unwrap();
        if let ConnectionState::ReconnectScheduled { attempt, delay } = *states.borrow_and_update() {
            delays.push((attempt, delay));
        }
    }

    // THEN: Attempts count up and delays follow the table
    assert_eq!(
        delays,
        vec![
            (1, Duration::from_millis(50)),
            (2, Duration::from_millis(100)),
            (3, Duration::from_millis(150)),
        ]
    );

    client.disconnect().await.unwrap();
}

/// **VALUE**: Verifies `disconnect` cancels a pending reconnect for good.
///
/// **WHY THIS MATTERS**: After logout the console must not silently reconnect
/// with credentials the operator just discarded.
///
/// **BUG THIS CATCHES**: Would catch a reconnect timer that survives
/// `disconnect` and fires later.
#[tokio::test]
async fn given_pending_reconnect_when_disconnect_then_no_further_attempts() {
    // GIVEN: A dropped connection with a slow reconnect pending
    let mut server = start_test_server().await;
    let mut config = test_config(&server.url);
    config.reconnect.delays_ms = vec![200];
    let client = ConsoleClient::new(config);
    let mut states = client.watch_state();
    client.connect(&server.url).await.unwrap();
    drop(server.next_connection().await);
    timeout(
        WAIT,
        states.wait_for(|s| matches!(s, ConnectionState::ReconnectScheduled { .. })),
    )
    .await
    .expect("reconnect was never scheduled")
    .unwrap();

    // WHEN: Disconnecting before the timer fires
    client.disconnect().await.unwrap();

    // THEN: Idle, and nobody connects again
    assert_eq!(client.state(), ConnectionState::Idle);
    server.expect_no_connection(Duration::from_millis(500)).await;
    assert_eq!(client.state(), ConnectionState::Idle);
}

/// **VALUE**: Verifies queued writes survive a disconnect.
///
/// **BUG THIS CATCHES**: Would catch disconnect clearing the outbound queue.
#[tokio::test]
async fn given_queued_send_when_disconnect_and_reconnect_then_flushed() {
    // GIVEN: A message queued before any connection, then a disconnect
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    let message = ClientMessageBuilder::default()
        .with_action("config_get")
        .with_config_type("meta")
        .build()
        .unwrap();
    client.send(message).unwrap();
    client.disconnect().await.unwrap();

    // WHEN: Connecting afterwards
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;

    // THEN: The queued frame is the first one transmitted
    assert_eq!(
        conn.recv_json().await,
        json!({"action": "config_get", "config_type": "meta"})
    );
}

#[tokio::test]
async fn given_invalid_url_when_connect_then_connect_error() {
    let client = ConsoleClient::new(test_config("ws://127.0.0.1:1"));

    let result = client.connect("not a url").await;

    assert!(matches!(
        result,
        Err(client_core::error::ws::WsError::Connect { .. })
    ));
}

/// **VALUE**: Verifies that `connect` rejects a URL that is not `ws://` or `wss://`.
///
/// **WHY THIS MATTERS**: The no-auth path retries forever, so accepting an
/// `http://` URL would schedule reconnects that can never succeed.
///
/// **BUG THIS CATCHES**: Would catch `connect` checking only that the URL parses.
#[tokio::test]
async fn given_non_websocket_scheme_when_connect_then_connect_error_and_no_retry() {
    let client = ConsoleClient::new(test_config("ws://127.0.0.1:1"));

    let result = client.connect("http://127.0.0.1:1").await;

    assert!(matches!(
        result,
        Err(client_core::error::ws::WsError::Connect { .. })
    ));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(client.state(), ConnectionState::Idle);
}

#[tokio::test]
async fn given_client_when_disconnect_then_socket_closed() {
    let mut server = start_test_server().await;
    let client = ConsoleClient::new(test_config(&server.url));
    client.connect(&server.url).await.unwrap();
    let mut conn = server.next_connection().await;

    client.disconnect().await.unwrap();

    assert!(conn.is_closed().await);
}

#[test]
fn given_request_builders_when_used_without_client_then_pure() {
    let message = requests::get_notices(1, 10).unwrap();
    assert_eq!(message.action(), "notice_get");
}
