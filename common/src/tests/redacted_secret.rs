use crate::RedactedSecret;

/// **VALUE**: Verifies that Debug and Display never leak the secret.
///
/// **WHY THIS MATTERS**: Credentials live inside the connection task for the whole
/// session and the task logs its state at debug level. A derived Debug would print
/// the operator password into the log file.
///
/// **BUG THIS CATCHES**: Would catch if someone swaps the manual impls for `#[derive(Debug)]`.
#[test]
fn given_secret_when_formatted_then_value_is_hidden() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("hunter2");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{secret:?}");
    let display = secret.to_string();

    // THEN: Neither contains the value
    assert!(!debug.contains("hunter2"));
    assert!(!display.contains("hunter2"));
    assert_eq!(secret.expose(), "hunter2");
}

/// **VALUE**: Verifies that serializing a secret fails instead of writing the value.
///
/// **WHY THIS MATTERS**: Structures holding credentials may end up in serde paths
/// (config dumps, debug JSON). The value must only leave through `expose()`.
///
/// **BUG THIS CATCHES**: Would catch if the Serialize impl starts emitting the inner string.
#[test]
fn given_secret_when_serialized_then_returns_error() {
    // GIVEN: A secret
    let secret = RedactedSecret::new("hunter2");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&secret);

    // THEN: Serialization is refused
    assert!(result.is_err(), "Secret serialization must fail");
}

/// **VALUE**: Verifies that `replace` swaps in the new password.
///
/// **WHY THIS MATTERS**: A successful password change updates the retained credentials
/// so later reconnects authenticate with the new password.
///
/// **BUG THIS CATCHES**: Would catch if `replace` zeroizes without storing the new value.
#[test]
fn given_secret_when_replaced_then_exposes_new_value() {
    // GIVEN: A secret
    let mut secret = RedactedSecret::new("old-password");

    // WHEN: Replacing it
    secret.replace("new-password");

    // THEN: The new value is exposed
    assert_eq!(secret.expose(), "new-password");
    assert_eq!(secret.len(), "new-password".len());
}
