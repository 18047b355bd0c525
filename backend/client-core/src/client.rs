//! Caller-facing client handle.
//!
//! # Architecture
//!
//! [`ConsoleClient`] is a cheap `Clone` handle. Operations become commands on
//! an unbounded channel read by a single connection task, which is spawned on
//! the first `connect*` call. Commands sent before that (for example early
//! `send` calls) wait in the channel and are applied in order once the task
//! starts. The task stops when the last handle is dropped.

use crate::auth::Credentials;
use crate::config::{ClientConfig, validate_ws_url};
use crate::connection::actor::{ActorSettings, Command, ConnectTarget, ConnectionActor};
use crate::connection::state::ConnectionState;
use crate::error::ws::WsError;
use crate::router::{Discriminator, MessageRouter, Subscription, SubscriptionId};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};
use models::{ClientMessage, ServerFrame};
use tokio::sync::{mpsc, oneshot, watch};
use url::Url;

struct ClientInner {
    config: ClientConfig,
    router: MessageRouter,
    commands: mpsc::UnboundedSender<Command>,
    /// Taken and spawned on the first connect.
    actor: Mutex<Option<ConnectionActor>>,
    state: watch::Receiver<ConnectionState>,
}

/// Real-time client for the inspection backend.
#[derive(Clone)]
pub struct ConsoleClient {
    inner: Arc<ClientInner>,
}

impl ConsoleClient {
    pub fn new(config: ClientConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let router = MessageRouter::new();

        let actor = ConnectionActor::new(
            command_rx,
            router.clone(),
            state_tx,
            ActorSettings::from(&config),
        );

        Self {
            inner: Arc::new(ClientInner {
                config,
                router,
                commands: command_tx,
                actor: Mutex::new(Some(actor)),
                state: state_rx,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn router(&self) -> &MessageRouter {
        &self.inner.router
    }

    // ============================================
    // CONNECTION
    // ============================================

    /// Open a connection to `url` without a handshake.
    ///
    /// Returns once the first open attempt was made. A refused or failed open
    /// is not an error here; it schedules a reconnect.
    ///
    /// # Errors
    ///
    /// - [`WsError::Connect`] if `url` is not a `ws://` or `wss://` URL
    /// - [`WsError::Closed`] if the connection task has stopped
    pub async fn connect(&self, url: &str) -> Result<(), WsError> {
        validate_ws_url(url).map_err(|message| WsError::Connect {
            message,
            location: ErrorLocation::from(Location::caller()),
        })?;
        let url = Url::parse(url)?;
        self.request(|reply| Command::Connect {
            target: ConnectTarget::Open {
                url: url.to_string(),
            },
            reply,
        })
        .await
    }

    /// Open an authenticated connection to the configured URL.
    ///
    /// Resolves once the server accepts the credentials. The credentials are
    /// kept for reconnects until [`ConsoleClient::disconnect`].
    ///
    /// # Errors
    ///
    /// - [`WsError::Connect`] / [`WsError::Transport`] if the socket fails before authentication
    /// - [`WsError::Timeout`] if connecting or the handshake takes too long
    /// - [`WsError::Auth`] if the server rejects the credentials
    /// - [`WsError::Disconnected`] if `disconnect` is called first
    pub async fn connect_with_auth(&self, username: &str, password: &str) -> Result<(), WsError> {
        let url = Url::parse(&self.inner.config.connection.url)?;
        info!("Authenticating as '{}' at {}", username, url);
        self.request(|reply| Command::Connect {
            target: ConnectTarget::Authenticated {
                url: url.to_string(),
                credentials: Credentials::new(username, password),
            },
            reply,
        })
        .await
    }

    /// Rotate the password of the authenticated connection.
    ///
    /// On success later reconnects use `new_password`.
    ///
    /// # Errors
    ///
    /// - [`WsError::NotConnected`] without an authenticated connection
    /// - [`WsError::PasswordChangeInFlight`] while another change is pending
    /// - [`WsError::Auth`] if the server rejects the change
    /// - [`WsError::Transport`] if the connection drops first
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), WsError> {
        let old_password = RedactedSecret::new(old_password);
        let new_password = RedactedSecret::new(new_password);
        self.request(|reply| Command::ChangePassword {
            old_password,
            new_password,
            reply,
        })
        .await
    }

    /// Close the connection and stop reconnecting.
    ///
    /// Retained credentials are dropped and pending calls fail with
    /// [`WsError::Disconnected`]. Messages still queued are kept for the next
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::Closed`] if the connection task has stopped.
    pub async fn disconnect(&self) -> Result<(), WsError> {
        self.ensure_actor();

        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Command::Disconnect { reply: reply_tx })?;
        reply_rx.await.map_err(|_| WsError::closed())
    }

    /// Transmit `message` now if connected, otherwise queue it.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::Closed`] only if the connection task has stopped.
    pub fn send(&self, message: ClientMessage) -> Result<(), WsError> {
        debug!("send '{}'", message.action());
        self.submit(Command::Send(message))
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.clone()
    }

    // ============================================
    // SUBSCRIPTIONS
    // ============================================

    pub fn subscribe<F>(&self, discriminator: impl Into<Discriminator>, handler: F) -> Subscription
    where
        F: Fn(&ServerFrame) + Send + Sync + 'static,
    {
        self.inner.router.subscribe(discriminator, handler)
    }

    /// Remove every handler for `discriminator`.
    pub fn unsubscribe(&self, discriminator: &str) -> usize {
        self.inner.router.unsubscribe(discriminator)
    }

    pub fn unsubscribe_handle(&self, id: SubscriptionId) -> bool {
        self.inner.router.unsubscribe_handle(id)
    }

    // ============================================
    // INTERNALS
    // ============================================

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T, WsError>>) -> Command,
    ) -> Result<T, WsError> {
        self.ensure_actor();

        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(command(reply_tx))?;
        reply_rx.await.map_err(|_| WsError::closed())?
    }

    fn submit(&self, command: Command) -> Result<(), WsError> {
        self.inner
            .commands
            .send(command)
            .map_err(|_| WsError::closed())
    }

    /// Spawn the connection task on first use. Must run inside a tokio runtime.
    fn ensure_actor(&self) {
        let mut slot = self
            .inner
            .actor
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(actor) = slot.take() {
            tokio::spawn(actor.run());
            info!("Connection task spawned");
        }
    }
}

impl std::fmt::Debug for ConsoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleClient")
            .field("url", &self.inner.config.connection.url)
            .field("state", &self.state())
            .finish()
    }
}
