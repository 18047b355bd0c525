pub use models::ServerAction;
use models::ServerFrame;

use std::borrow::Borrow;
use std::fmt;

/// Discriminator shared by every create/update/delete acknowledgement.
pub const CONFIG_CHANGED: &str = "config_update";

/// Client-side routing key for subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Discriminator(String);

impl Discriminator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for a recognized action.
    ///
    /// Create, update and delete acknowledgements share [`CONFIG_CHANGED`];
    /// `config_get` for type `X` becomes `ConfigX`.
    pub fn for_action(action: ServerAction, config_type: Option<&str>) -> Self {
        match action {
            ServerAction::ConfigCreate | ServerAction::ConfigUpdate | ServerAction::ConfigDelete => {
                Self::new(CONFIG_CHANGED)
            }
            ServerAction::ConfigGet => match config_type.filter(|t| !t.is_empty()) {
                Some(config_type) => Self(format!("Config{config_type}")),
                None => Self::new(action.as_str()),
            },
            other => Self::new(other.as_str()),
        }
    }
}

impl Borrow<str> for Discriminator {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Discriminator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Discriminator {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ServerAction> for Discriminator {
    fn from(action: ServerAction) -> Self {
        Self::for_action(action, None)
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an inbound frame goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `authenticate_response`, consumed by the connection task.
    Handshake,
    /// `change_password_response`, consumed by the connection task.
    PasswordChange,
    Dispatch(Discriminator),
    Unroutable,
}

impl Route {
    /// Resolve in priority order: handshake answers, known actions, the
    /// legacy `type` tag, then a bare `config_type`.
    pub fn resolve(frame: &ServerFrame) -> Self {
        if let Some(action) = frame.action.as_deref().and_then(ServerAction::parse) {
            return match action {
                ServerAction::Authenticate => Route::Handshake,
                ServerAction::ChangePassword => Route::PasswordChange,
                known => Route::Dispatch(Discriminator::for_action(
                    known,
                    frame.config_type.as_deref(),
                )),
            };
        }

        if let Some(kind) = non_empty(frame.kind.as_deref()) {
            return Route::Dispatch(Discriminator::new(kind));
        }

        if let Some(config_type) = non_empty(frame.config_type.as_deref()) {
            return Route::Dispatch(Discriminator::new(config_type));
        }

        Route::Unroutable
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
