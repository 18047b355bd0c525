use common::ErrorLocation;

use std::panic::Location;

use models::ModelError;
use thiserror::Error as ThisError;
use tokio_tungstenite::tungstenite::Error as TungsteniteError;

#[derive(Debug, ThisError)]
pub enum WsError {
    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Auth Error: {message} {location}")]
    Auth {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Connected Error: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Password Change In Flight Error: {message} {location}")]
    PasswordChangeInFlight {
        message: String,
        location: ErrorLocation,
    },

    #[error("Disconnected Error: {message} {location}")]
    Disconnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },
}

impl WsError {
    /// Failures that come from the network rather than from the server's answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WsError::Connect { .. } | WsError::Transport { .. } | WsError::Timeout { .. }
        )
    }

    #[track_caller]
    pub(crate) fn closed() -> Self {
        WsError::Closed {
            message: String::from("Connection task is no longer running"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<TungsteniteError> for WsError {
    #[track_caller]
    fn from(error: TungsteniteError) -> Self {
        WsError::Transport {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ModelError> for WsError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        WsError::Encode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for WsError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        WsError::Connect {
            message: format!("Invalid server URL: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
