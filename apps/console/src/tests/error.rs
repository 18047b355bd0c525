// Unit tests for error module

use crate::error::ConsoleError;

use client_core::error::ws::WsError;
use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies library errors keep their message when wrapped.
///
/// **WHY THIS MATTERS**: The operator only sees the console's error line; the
/// backend's rejection text must survive the conversion.
///
/// **BUG THIS CATCHES**: Would catch a `From` impl that drops the source
/// message.
#[test]
fn given_ws_auth_error_when_converted_then_message_preserved() {
    // GIVEN: A rejected handshake
    let ws = WsError::Auth {
        message: String::from("invalid username or password"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Converted for the console
    let err: ConsoleError = ws.into();

    // THEN: Core error carrying the server text
    let error_string = err.to_string();
    assert!(error_string.starts_with("Core Error"));
    assert!(error_string.contains("invalid username or password"));
}

#[test]
fn given_server_error_when_formatted_then_includes_location() {
    let err = ConsoleError::Server {
        message: String::from("task not found"),
        location: ErrorLocation::from(Location::caller()),
    };

    let error_string = format!("{}", err);

    assert!(error_string.contains("Server Error: task not found"));
    assert!(error_string.contains("error.rs"));
}
