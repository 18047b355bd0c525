// Unit tests for handshake messages

use crate::auth::{Credentials, change_password_message};

/// **VALUE**: Verifies the handshake token is `Basic base64(user:pass)`.
///
/// **WHY THIS MATTERS**: The backend decodes exactly this format; any other
/// encoding is rejected and the console never gets past authentication.
///
/// **BUG THIS CATCHES**: Would catch a missing `Basic ` prefix, a URL-safe
/// alphabet, or a wrong separator.
#[test]
fn given_credentials_when_auth_token_then_uses_basic_scheme() {
    // GIVEN: Known credentials
    let credentials = Credentials::new("admin", "secret");

    // WHEN: Building the token
    let token = credentials.auth_token();

    // THEN: It matches the standard Basic encoding of "admin:secret"
    assert_eq!(token, "Basic YWRtaW46c2VjcmV0");
}

#[test]
fn given_credentials_when_authenticate_message_then_carries_token_only() {
    let credentials = Credentials::new("admin", "secret");

    let message = credentials
        .authenticate_message()
        .expect("authenticate message should build");

    assert_eq!(message.action(), "authenticate");
    assert_eq!(message.auth_token(), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(message.config_type(), None);
    assert_eq!(message.config_data(), None);
}

/// **VALUE**: Verifies Debug output never contains the password.
///
/// **BUG THIS CATCHES**: Would catch a derived Debug leaking the password
/// into logs when a connect target is printed.
#[test]
fn given_credentials_when_debug_formatted_then_password_is_redacted() {
    let credentials = Credentials::new("admin", "hunter2");

    let debug = format!("{credentials:?}");

    assert!(debug.contains("admin"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn given_passwords_when_change_password_message_then_targets_auth_config() {
    let message = change_password_message("old", "new").expect("message should build");

    assert_eq!(message.action(), "change_password");
    assert_eq!(message.config_type(), Some("auth"));
    assert_eq!(message.old_password(), Some("old"));
    assert_eq!(message.new_password(), Some("new"));
    let masked = message.masked_json();
    assert!(!masked.contains("\"old\""));
    assert!(!masked.contains("\"new\""));
}
