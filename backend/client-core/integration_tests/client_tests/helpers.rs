//! Test helpers for client integration tests.
//!
//! This module provides a scripted in-process backend:
//! - Accepting client sockets on an ephemeral port
//! - Reading and writing JSON text frames
//! - Answering the authentication handshake

use client_core::config::ClientConfig;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "secret";

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Scripted backend listening on `127.0.0.1:0`.
pub struct TestServer {
    pub url: String,
    connections: mpsc::UnboundedReceiver<ServerConnection>,
}

impl TestServer {
    /// Wait for the next client socket.
    pub async fn next_connection(&mut self) -> ServerConnection {
        timeout(WAIT, self.connections.recv())
            .await
            .expect("Timed out waiting for a client connection")
            .expect("Accept loop stopped")
    }

    /// Assert no client connects within `window`.
    pub async fn expect_no_connection(&mut self, window: Duration) {
        if let Ok(Some(_)) = timeout(window, self.connections.recv()).await {
            panic!("Unexpected client connection");
        }
    }
}

pub struct ServerConnection {
    ws: WebSocketStream<TcpStream>,
}

impl ServerConnection {
    /// Next text frame as JSON.
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let msg = timeout(WAIT, self.ws.next())
                .await
                .expect("Timed out waiting for a client frame")
                .expect("Client closed the socket")
                .expect("Error receiving frame");

            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("Client frame is not JSON");
            }
        }
    }

    pub async fn send_json(&mut self, value: Value) {
        self.ws
            .send(Message::text(value.to_string()))
            .await
            .expect("Failed to send frame");
    }

    /// Read the handshake frame and return its token.
    pub async fn expect_authenticate(&mut self) -> String {
        let frame = self.recv_json().await;
        assert_eq!(frame["action"], "authenticate", "first frame: {frame}");
        frame["auth_token"]
            .as_str()
            .expect("authenticate without auth_token")
            .to_string()
    }

    /// Read the handshake frame and accept it.
    pub async fn accept_auth(&mut self) -> String {
        let token = self.expect_authenticate().await;
        self.send_json(json!({"action": "authenticate_response", "success": true}))
            .await;
        token
    }

    pub async fn reject_auth(&mut self, message: &str) {
        self.expect_authenticate().await;
        self.send_json(json!({
            "action": "authenticate_response",
            "success": false,
            "message": message
        }))
        .await;
    }

    /// True once the client has closed its end.
    pub async fn is_closed(&mut self) -> bool {
        match timeout(WAIT, self.ws.next()).await {
            Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => true,
            Ok(Some(Ok(_))) | Err(_) => false,
        }
    }
}

/// Start a scripted backend that hands every accepted socket to the test.
pub async fn start_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let port = listener.local_addr().expect("No local address").port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            if let Ok(ws) = accept_async(stream).await
                && tx.send(ServerConnection { ws }).is_err()
            {
                break;
            }
        }
    });

    TestServer {
        url: format!("ws://127.0.0.1:{port}"),
        connections: rx,
    }
}

/// A URL nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("ws://127.0.0.1:{port}")
}

/// Config with short timers so reconnect tests stay fast.
pub fn test_config(url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.connection.url = url.to_string();
    config.connection.connect_timeout_ms = 2_000;
    config.connection.handshake_timeout_ms = 2_000;
    config.reconnect.delays_ms = vec![50, 100, 150];
    config
}
