use crate::{ClientMessageBuilder, ModelError};

use serde_json::{Value, json};

/// **VALUE**: Verifies that the builder refuses a message without an action.
///
/// **WHY THIS MATTERS**: The backend dispatches purely on `action`. A frame without one
/// is silently ignored server-side, so the caller would wait forever for a reply.
///
/// **BUG THIS CATCHES**: Would catch if the required-field check is removed from `build()`.
#[test]
fn given_missing_action_when_building_then_returns_validation_error() {
    // GIVEN: Builder with only a config type
    let builder = ClientMessageBuilder::default().with_config_type("DB");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => assert_eq!(message, "Action is required"),
        other => panic!("Expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that a blank action is rejected too.
///
/// **WHY THIS MATTERS**: `"   "` passes an `is_some()` check but is as useless as no action.
///
/// **BUG THIS CATCHES**: Would catch if validation only checks presence, not content.
#[test]
fn given_blank_action_when_building_then_returns_validation_error() {
    // GIVEN: Builder with whitespace action
    let builder = ClientMessageBuilder::default().with_action("   ");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Action cannot be empty")
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that unset optional fields are left out of the JSON.
///
/// **WHY THIS MATTERS**: The backend treats a present-but-null `config_type` differently
/// from an absent one for some actions (`task_listen` has no type at all).
///
/// **BUG THIS CATCHES**: Would catch if `skip_serializing_if` is dropped from a field.
#[test]
fn given_action_only_message_when_serialized_then_omits_optional_fields() {
    // GIVEN: A message with only an action
    let message = ClientMessageBuilder::default()
        .with_action("task_listen")
        .build()
        .expect("valid message");

    // WHEN: Serializing
    let json: Value = serde_json::from_str(&message.to_json().expect("encodes")).unwrap();

    // THEN: Only the action is present
    assert_eq!(json, json!({"action": "task_listen"}));
}

/// **VALUE**: Verifies that log rendering masks credentials and sensitive config fields.
///
/// **WHY THIS MATTERS**: Outbound frames are traced verbatim for debugging. The
/// authenticate, change_password and DB config frames all carry secrets.
///
/// **BUG THIS CATCHES**: Would catch if `masked_json` forgets a credential field or stops
/// masking nested config values.
#[test]
fn given_message_with_secrets_when_masked_then_no_secret_in_output() {
    // GIVEN: A password change carrying a DB config with a DSN
    let message = ClientMessageBuilder::default()
        .with_action("change_password")
        .with_auth_token("Basic c2VjcmV0")
        .with_password_change("old-secret", "new-secret")
        .with_config_data(json!({"Identity": "db1", "DSN": "user:pw@tcp(db)/x"}))
        .build()
        .expect("valid message");

    // WHEN: Rendering for logs
    let masked = message.masked_json();

    // THEN: No secret survives, non-sensitive data does
    assert!(!masked.contains("old-secret"));
    assert!(!masked.contains("new-secret"));
    assert!(!masked.contains("c2VjcmV0"));
    assert!(!masked.contains("user:pw"));
    assert!(masked.contains("db1"));
}
