//! Credential handshake messages.
//!
//! The server expects `authenticate` with an HTTP-style Basic token as the
//! first frame on a new socket, and `change_password` to rotate it.

use common::RedactedSecret;

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use models::{ClientMessage, ClientMessageBuilder, ModelError};

pub const AUTHENTICATE_ACTION: &str = "authenticate";
pub const CHANGE_PASSWORD_ACTION: &str = "change_password";
pub const AUTH_CONFIG_TYPE: &str = "auth";

/// Username and password retained for re-authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: RedactedSecret,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: RedactedSecret::new(password),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &RedactedSecret {
        &self.password
    }

    /// `Basic base64(username:password)`.
    pub fn auth_token(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password.expose());
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// The handshake frame sent right after the socket opens.
    pub fn authenticate_message(&self) -> Result<ClientMessage, ModelError> {
        ClientMessageBuilder::default()
            .with_action(AUTHENTICATE_ACTION)
            .with_auth_token(self.auth_token())
            .build()
    }

    pub(crate) fn set_password(&mut self, password: &RedactedSecret) {
        self.password.replace(password.expose());
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

/// `{action: change_password, config_type: auth, old_password, new_password}`.
pub fn change_password_message(
    old_password: &str,
    new_password: &str,
) -> Result<ClientMessage, ModelError> {
    ClientMessageBuilder::default()
        .with_action(CHANGE_PASSWORD_ACTION)
        .with_config_type(AUTH_CONFIG_TYPE)
        .with_password_change(old_password, new_password)
        .build()
}
