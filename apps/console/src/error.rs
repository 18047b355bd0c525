use client_core::error::CoreError;
use client_core::error::config::ConfigError;
use client_core::error::ws::WsError;
use common::ErrorLocation;

use std::panic::Location;

use models::ModelError;
use thiserror::Error;

/// Errors surfaced by the console binary.
///
/// Library errors keep their own location; the wrapper records where the
/// console received them.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Error from this binary
    #[error("Console Error: {message} {location}")]
    Console {
        message: String,
        location: ErrorLocation,
    },

    /// Error from client-core operations (connect, send, config)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The backend answered with `success = false`
    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
    },

    /// No answer arrived in time
    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for ConsoleError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        ConsoleError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<WsError> for ConsoleError {
    #[track_caller]
    fn from(error: WsError) -> Self {
        ConsoleError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for ConsoleError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        ConsoleError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ModelError> for ConsoleError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        ConsoleError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
