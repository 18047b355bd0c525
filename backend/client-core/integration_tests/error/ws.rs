use client_core::error::CoreError;
use client_core::error::ws::WsError;
use common::ErrorLocation;

use std::panic::Location;

use models::ClientMessageBuilder;
use tokio_tungstenite::tungstenite::Error as TungsteniteError;

/// **VALUE**: Verifies that `WsError::Auth` includes the server message and location.
///
/// **WHY THIS MATTERS**: Rejected handshakes are shown to the operator and
/// logged; the log line must point at the code that produced it.
///
/// **BUG THIS CATCHES**: Would catch if someone:
/// - Drops the server message from the Display format
/// - Removes location from the error Display implementation
#[test]
#[track_caller]
fn given_auth_error_when_formatted_then_includes_message_and_location() {
    // GIVEN: An Auth error with location
    let err = WsError::Auth {
        message: "invalid username or password".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting the error as string
    let error_string = format!("{}", err);

    // THEN: Should include error type, message, and file location
    assert!(error_string.contains("Auth Error"));
    assert!(error_string.contains("invalid username or password"));
    assert!(error_string.contains("ws.rs"));
}

/// **VALUE**: Verifies tungstenite errors convert into transport failures.
///
/// **WHY THIS MATTERS**: Transport failures trigger reconnects; auth failures
/// surface to the operator. The two must never be confused.
///
/// **BUG THIS CATCHES**: Would catch a `From` impl mapping socket errors to
/// the wrong variant.
#[test]
fn given_tungstenite_error_when_converted_then_transport_variant() {
    // GIVEN: A closed-connection error from the socket layer
    let source = TungsteniteError::ConnectionClosed;

    // WHEN: Converted
    let err: WsError = source.into();

    // THEN: Transport, and classified as such
    assert!(matches!(err, WsError::Transport { .. }));
    assert!(err.is_transport());
}

#[test]
fn given_model_error_when_converted_then_encode_variant() {
    let model_err = ClientMessageBuilder::default().build().unwrap_err();

    let err: WsError = model_err.into();

    assert!(matches!(err, WsError::Encode { .. }));
    assert!(!err.is_transport());
    assert!(format!("{err}").contains("Action is required"));
}

#[test]
fn given_ws_error_when_wrapped_in_core_error_then_display_is_transparent() {
    let err = WsError::NotConnected {
        message: "no session".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = err.to_string();

    let core: CoreError = err.into();

    assert_eq!(core.to_string(), expected);
}
