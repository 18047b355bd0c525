//! Connection task.
//!
//! Owns the socket and everything whose ordering matters: the outbound
//! queue, the reconnect deadline, the handshake deadline and the calls still
//! waiting on the server. The run loop polls commands first, so a disconnect
//! already submitted always beats a reconnect timer that is due.

use crate::auth::{Credentials, change_password_message};
use crate::config::ClientConfig;
use crate::connection::backoff::TableBackoff;
use crate::connection::state::ConnectionState;
use crate::error::ws::WsError;
use crate::router::{MessageRouter, Route};

use common::{ErrorLocation, RedactedSecret};

use std::collections::VecDeque;
use std::panic::Location;
use std::time::Duration;

use backoff::backoff::Backoff;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use models::{ClientMessage, ServerFrame};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until, timeout};
use tokio_tungstenite::tungstenite::{Error as TungsteniteError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type Reply<T> = oneshot::Sender<Result<T, WsError>>;

/// What the connection task reconnects to.
#[derive(Debug, Clone)]
pub(crate) enum ConnectTarget {
    Open {
        url: String,
    },
    Authenticated {
        url: String,
        credentials: Credentials,
    },
}

impl ConnectTarget {
    fn url(&self) -> &str {
        match self {
            ConnectTarget::Open { url } | ConnectTarget::Authenticated { url, .. } => url,
        }
    }

    fn credentials(&self) -> Option<&Credentials> {
        match self {
            ConnectTarget::Open { .. } => None,
            ConnectTarget::Authenticated { credentials, .. } => Some(credentials),
        }
    }
}

pub(crate) enum Command {
    Connect {
        target: ConnectTarget,
        reply: Reply<()>,
    },
    Send(ClientMessage),
    ChangePassword {
        old_password: RedactedSecret,
        new_password: RedactedSecret,
        reply: Reply<()>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct ActorSettings {
    pub connect_timeout: Duration,
    pub handshake_timeout: Duration,
    pub delays: Vec<Duration>,
    pub max_auth_attempts: u32,
    pub retry_after_auth_failure: bool,
}

impl From<&ClientConfig> for ActorSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            handshake_timeout: config.handshake_timeout(),
            delays: config.reconnect_delays(),
            max_auth_attempts: config.reconnect.max_auth_attempts,
            retry_after_auth_failure: config.reconnect.retry_after_auth_failure,
        }
    }
}

struct PendingPasswordChange {
    new_password: RedactedSecret,
    reply: Reply<()>,
}

pub(crate) struct ConnectionActor {
    commands: mpsc::UnboundedReceiver<Command>,
    router: MessageRouter,
    state: watch::Sender<ConnectionState>,
    settings: ActorSettings,
    target: Option<ConnectTarget>,
    socket: Option<Socket>,
    queue: VecDeque<ClientMessage>,
    backoff: TableBackoff,
    reconnect_at: Option<Instant>,
    handshake_deadline: Option<Instant>,
    pending_connect: Option<Reply<()>>,
    pending_password: Option<PendingPasswordChange>,
}

impl ConnectionActor {
    pub(crate) fn new(
        commands: mpsc::UnboundedReceiver<Command>,
        router: MessageRouter,
        state: watch::Sender<ConnectionState>,
        settings: ActorSettings,
    ) -> Self {
        let backoff = TableBackoff::new(settings.delays.clone(), None);
        Self {
            commands,
            router,
            state,
            settings,
            target: None,
            socket: None,
            queue: VecDeque::new(),
            backoff,
            reconnect_at: None,
            handshake_deadline: None,
            pending_connect: None,
            pending_password: None,
        }
    }

    /// Process commands, frames and timers until every client handle is dropped.
    pub(crate) async fn run(mut self) {
        debug!("Connection task started");

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },

                incoming = next_incoming(&mut self.socket) => {
                    self.handle_incoming(incoming).await;
                }

                () = wait_until(self.reconnect_at) => {
                    self.reconnect_at = None;
                    self.open().await;
                }

                () = wait_until(self.handshake_deadline) => {
                    self.handshake_deadline = None;
                    warn!("Authentication response not received in time");
                    self.close_socket().await;
                    self.on_socket_closed(timeout_error("Authentication response timed out"))
                        .await;
                }
            }
        }

        self.close_socket().await;
        if !self.queue.is_empty() {
            warn!(
                "Connection task stopped with {} unsent message(s)",
                self.queue.len()
            );
        }
        debug!("Connection task stopped");
    }

    // ============================================
    // COMMANDS
    // ============================================

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { target, reply } => self.handle_connect(target, reply).await,
            Command::Send(message) => self.handle_send(message).await,
            Command::ChangePassword {
                old_password,
                new_password,
                reply,
            } => {
                self.handle_change_password(old_password, new_password, reply)
                    .await
            }
            Command::Disconnect { reply } => {
                self.handle_disconnect().await;
                let _ = reply.send(());
            }
        }
    }

    async fn handle_connect(&mut self, target: ConnectTarget, reply: Reply<()>) {
        if self.socket.is_some() || self.reconnect_at.is_some() {
            info!("Replacing existing connection to {}", self.target_url());
            self.reset("Superseded by a new connect call").await;
        }

        let authenticated = target.credentials().is_some();
        let max_attempts = authenticated.then_some(self.settings.max_auth_attempts);
        self.backoff = TableBackoff::new(self.settings.delays.clone(), max_attempts);
        self.target = Some(target);

        if authenticated {
            self.pending_connect = Some(reply);
            self.open().await;
        } else {
            // A failed open only schedules a retry.
            self.open().await;
            let _ = reply.send(Ok(()));
        }
    }

    async fn handle_send(&mut self, message: ClientMessage) {
        if !self.is_state(ConnectionState::Connected) || self.socket.is_none() {
            debug!(
                "Queued '{}' while {} ({} queued)",
                message.action(),
                *self.state.borrow(),
                self.queue.len() + 1
            );
            self.queue.push_back(message);
            return;
        }

        match self.write(&message).await {
            Ok(()) => {}
            Err(e @ WsError::Encode { .. }) => {
                error!("Dropping '{}' message: {}", message.action(), e);
            }
            Err(e) => {
                warn!("Send failed, re-queueing '{}': {}", message.action(), e);
                self.queue.push_back(message);
                self.on_socket_closed(e).await;
            }
        }
    }

    async fn handle_change_password(
        &mut self,
        old_password: RedactedSecret,
        new_password: RedactedSecret,
        reply: Reply<()>,
    ) {
        if self.pending_password.is_some() {
            let _ = reply.send(Err(WsError::PasswordChangeInFlight {
                message: "A password change is already waiting for the server".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }));
            return;
        }

        let holds_credentials = self
            .target
            .as_ref()
            .is_some_and(|target| target.credentials().is_some());
        if !holds_credentials || !self.is_state(ConnectionState::Connected) {
            let _ = reply.send(Err(WsError::NotConnected {
                message: "Changing the password requires an authenticated connection"
                    .to_string(),
                location: ErrorLocation::from(Location::caller()),
            }));
            return;
        }

        let message = match change_password_message(old_password.expose(), new_password.expose())
        {
            Ok(message) => message,
            Err(e) => {
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        if let Err(e) = self.write(&message).await {
            let transport = e.is_transport();
            let _ = reply.send(Err(e));
            if transport {
                self.on_socket_closed(transport_error("Connection lost while changing password"))
                    .await;
            }
            return;
        }

        info!("Password change sent");
        self.pending_password = Some(PendingPasswordChange {
            new_password,
            reply,
        });
    }

    async fn handle_disconnect(&mut self) {
        info!("Disconnecting from {}", self.target_url());
        self.reset("Disconnected by caller").await;
        self.target = None;
        self.set_state(ConnectionState::Idle);
    }

    /// Close the socket and cancel timers and waiting calls without
    /// scheduling a reconnect.
    async fn reset(&mut self, reason: &str) {
        self.reconnect_at = None;
        self.handshake_deadline = None;
        self.backoff.reset();

        if let Some(reply) = self.pending_connect.take() {
            let _ = reply.send(Err(disconnected_error(reason)));
        }
        if let Some(pending) = self.pending_password.take() {
            let _ = pending.reply.send(Err(disconnected_error(reason)));
        }

        self.close_socket().await;
    }

    // ============================================
    // SOCKET LIFECYCLE
    // ============================================

    async fn open(&mut self) {
        let Some(url) = self.target.as_ref().map(|t| t.url().to_string()) else {
            return;
        };

        self.set_state(ConnectionState::Connecting);
        info!("Connecting to {}", url);

        let socket = match timeout(self.settings.connect_timeout, connect_async(url.as_str())).await
        {
            Ok(Ok((socket, _response))) => socket,
            Ok(Err(e)) => {
                warn!("Failed to connect to {}: {}", url, e);
                self.on_socket_closed(WsError::Connect {
                    message: format!("Failed to connect to {url}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })
                .await;
                return;
            }
            Err(_) => {
                warn!("Timed out connecting to {}", url);
                self.on_socket_closed(timeout_error(&format!("Timed out connecting to {url}")))
                    .await;
                return;
            }
        };

        self.socket = Some(socket);
        info!("Connected to {}", url);

        let authenticate = self
            .target
            .as_ref()
            .and_then(ConnectTarget::credentials)
            .map(Credentials::authenticate_message);

        match authenticate {
            None => {
                self.backoff.reset();
                self.set_state(ConnectionState::Connected);
                self.flush_queue().await;
            }
            Some(Ok(message)) => {
                self.set_state(ConnectionState::Authenticating);
                self.handshake_deadline = Some(Instant::now() + self.settings.handshake_timeout);
                if let Err(e) = self.write(&message).await {
                    warn!("Failed to send authentication: {}", e);
                    self.close_socket().await;
                    self.on_socket_closed(e).await;
                }
            }
            Some(Err(e)) => {
                error!("Failed to build authentication message: {}", e);
                self.close_socket().await;
                self.on_socket_closed(e.into()).await;
            }
        }
    }

    async fn on_socket_closed(&mut self, error: WsError) {
        self.socket = None;
        self.handshake_deadline = None;

        if let Some(pending) = self.pending_password.take() {
            let _ = pending.reply.send(Err(transport_error(
                "Connection closed before the password change was acknowledged",
            )));
        }
        if let Some(reply) = self.pending_connect.take() {
            let _ = reply.send(Err(error));
        } else {
            debug!("Connection closed: {}", error);
        }

        self.set_state(ConnectionState::Disconnected);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.target.is_none() {
            return;
        }

        match self.backoff.next_backoff() {
            Some(delay) => {
                let attempt = self.backoff.attempt();
                info!(
                    "Reconnecting to {} in {}ms (attempt {})",
                    self.target_url(),
                    delay.as_millis(),
                    attempt
                );
                self.reconnect_at = Some(Instant::now() + delay);
                self.set_state(ConnectionState::ReconnectScheduled { attempt, delay });
            }
            None => {
                warn!(
                    "Giving up on {} after {} attempt(s)",
                    self.target_url(),
                    self.backoff.attempt()
                );
            }
        }
    }

    async fn close_socket(&mut self) {
        if let Some(mut socket) = self.socket.take()
            && let Err(e) = socket.close(None).await
        {
            debug!("Error closing socket: {}", e);
        }
    }

    async fn write(&mut self, message: &ClientMessage) -> Result<(), WsError> {
        let Some(socket) = self.socket.as_mut() else {
            return Err(WsError::NotConnected {
                message: format!("No open socket for '{}'", message.action()),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let text = message.to_json()?;
        trace!("-> {}", message.masked_json());
        socket.send(Message::text(text)).await?;
        Ok(())
    }

    async fn flush_queue(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        let total = self.queue.len();
        while let Some(message) = self.queue.pop_front() {
            match self.write(&message).await {
                Ok(()) => {}
                Err(e @ WsError::Encode { .. }) => {
                    error!("Dropping queued '{}' message: {}", message.action(), e);
                }
                Err(e) => {
                    warn!("Flush interrupted with {} left: {}", self.queue.len() + 1, e);
                    self.queue.push_front(message);
                    self.on_socket_closed(e).await;
                    return;
                }
            }
        }

        info!("Flushed {} queued message(s)", total);
    }

    // ============================================
    // INBOUND
    // ============================================

    async fn handle_incoming(&mut self, incoming: Option<Result<Message, TungsteniteError>>) {
        match incoming {
            Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()).await,
            Some(Ok(Message::Close(frame))) => {
                debug!("Server sent close: {:?}", frame);
                self.socket = None;
                self.on_socket_closed(transport_error("Connection closed by server"))
                    .await;
            }
            Some(Ok(other)) => trace!("Ignoring non-text frame ({} bytes)", other.len()),
            Some(Err(e)) => {
                warn!("Socket error: {}", e);
                self.socket = None;
                self.on_socket_closed(e.into()).await;
            }
            None => {
                self.socket = None;
                self.on_socket_closed(transport_error("Connection closed"))
                    .await;
            }
        }
    }

    async fn handle_text(&mut self, text: &str) {
        let frame = match ServerFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping undecodable frame: {}", e);
                return;
            }
        };

        match Route::resolve(&frame) {
            Route::Handshake => self.on_handshake_response(&frame).await,
            Route::PasswordChange => self.on_password_change_response(&frame),
            route if self.is_state(ConnectionState::Authenticating) => {
                debug!("Dropping {:?} received before authentication", route);
            }
            Route::Dispatch(discriminator) => {
                let handled = self.router.dispatch(&discriminator, &frame);
                trace!("'{}' delivered to {} handler(s)", discriminator, handled);
            }
            Route::Unroutable => debug!("Dropping unroutable frame: {}", text),
        }
    }

    async fn on_handshake_response(&mut self, frame: &ServerFrame) {
        if !self.is_state(ConnectionState::Authenticating) {
            match frame.failure_message() {
                Some(message) => warn!("Unexpected failed authentication response: {}", message),
                None => debug!("Ignoring authentication response outside a handshake"),
            }
            return;
        }

        self.handshake_deadline = None;

        if let Some(message) = frame.failure_message() {
            warn!("Authentication rejected: {}", message);
            if let Some(reply) = self.pending_connect.take() {
                let _ = reply.send(Err(WsError::Auth {
                    message: message.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }));
            }

            self.close_socket().await;
            self.set_state(ConnectionState::Disconnected);

            if self.settings.retry_after_auth_failure {
                self.schedule_reconnect();
            } else {
                info!("Not retrying after rejected credentials");
            }
            return;
        }

        info!("Authenticated");
        self.backoff.reset();
        self.set_state(ConnectionState::Connected);
        if let Some(reply) = self.pending_connect.take() {
            let _ = reply.send(Ok(()));
        }
        self.flush_queue().await;
    }

    fn on_password_change_response(&mut self, frame: &ServerFrame) {
        let Some(pending) = self.pending_password.take() else {
            debug!("Ignoring unsolicited password change response");
            return;
        };

        if let Some(message) = frame.failure_message() {
            warn!("Password change rejected: {}", message);
            let _ = pending.reply.send(Err(WsError::Auth {
                message: message.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }));
            return;
        }

        if let Some(ConnectTarget::Authenticated { credentials, .. }) = self.target.as_mut() {
            credentials.set_password(&pending.new_password);
        }
        info!("Password changed");
        let _ = pending.reply.send(Ok(()));
    }

    // ============================================
    // HELPERS
    // ============================================

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!("Connection state: {} -> {}", previous, state);
        }
    }

    fn is_state(&self, state: ConnectionState) -> bool {
        *self.state.borrow() == state
    }

    fn target_url(&self) -> &str {
        self.target.as_ref().map_or("<none>", ConnectTarget::url)
    }
}

async fn next_incoming(socket: &mut Option<Socket>) -> Option<Result<Message, TungsteniteError>> {
    match socket {
        Some(socket) => socket.next().await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[track_caller]
fn transport_error(message: &str) -> WsError {
    WsError::Transport {
        message: message.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn timeout_error(message: &str) -> WsError {
    WsError::Timeout {
        message: message.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn disconnected_error(message: &str) -> WsError {
    WsError::Disconnected {
        message: message.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
