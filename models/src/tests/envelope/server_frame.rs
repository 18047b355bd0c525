use crate::{ModelError, Notice, ServerFrame};

use serde_json::json;

/// **VALUE**: Verifies that a modern envelope decodes field for field.
///
/// **WHY THIS MATTERS**: Handlers read `success`, `message` and `config_data` straight off
/// the decoded frame to drive operator-facing errors.
///
/// **BUG THIS CATCHES**: Would catch field renames or a wrong default for `success`.
#[test]
fn given_action_envelope_when_decoded_then_fields_are_preserved() {
    // GIVEN: A config_update acknowledgement
    let text = r#"{"action":"config_update","config_type":"db_config","success":true,"message":"","config_data":[1,2]}"#;

    // WHEN: Decoding
    let frame = ServerFrame::decode(text).expect("decodes");

    // THEN: Every field is carried over
    assert_eq!(frame.action.as_deref(), Some("config_update"));
    assert_eq!(frame.config_type.as_deref(), Some("db_config"));
    assert!(frame.success);
    assert_eq!(frame.config_data, json!([1, 2]));
    assert!(frame.kind.is_none());
}

/// **VALUE**: Verifies that the legacy `{type, data}` shape lands in the same fields.
///
/// **WHY THIS MATTERS**: Older backend builds still push index updates as `{type, data}`;
/// subscribers must not care which shape arrived.
///
/// **BUG THIS CATCHES**: Would catch if `data` is not moved into `config_data` or legacy
/// frames are reported as failures.
#[test]
fn given_legacy_envelope_when_decoded_then_data_becomes_config_data() {
    // GIVEN: A legacy push
    let text = r#"{"type":"ConfigIndex","data":[{"identity":"db1","type":"DB"}],"timestamp":17}"#;

    // WHEN: Decoding
    let frame = ServerFrame::decode(text).expect("decodes");

    // THEN: Tag and payload are normalized
    assert_eq!(frame.kind.as_deref(), Some("ConfigIndex"));
    assert!(frame.action.is_none());
    assert!(frame.success, "Legacy frames carry no failure flag");
    assert_eq!(frame.config_data, json!([{"identity": "db1", "type": "DB"}]));
}

/// **VALUE**: Verifies that a failure text sent as `error` becomes `message`.
///
/// **WHY THIS MATTERS**: The handshake rejection historically used `error`; the operator
/// must still see the server's reason.
///
/// **BUG THIS CATCHES**: Would catch if the `error` fallback is dropped.
#[test]
fn given_failure_with_error_field_when_decoded_then_message_is_populated() {
    // GIVEN: A rejected handshake
    let text = r#"{"action":"authenticate_response","success":false,"error":"bad credentials"}"#;

    // WHEN: Decoding
    let frame = ServerFrame::decode(text).expect("decodes");

    // THEN: The reason is available as the failure message
    assert_eq!(frame.failure_message(), Some("bad credentials"));
}

/// **VALUE**: Verifies that non-object JSON is rejected with a decode error.
///
/// **WHY THIS MATTERS**: The connection task logs and drops undecodable frames; it must be
/// told they are undecodable rather than routing an empty frame.
///
/// **BUG THIS CATCHES**: Would catch if arrays or scalars decode into an all-default frame.
#[test]
fn given_non_object_json_when_decoded_then_returns_decode_error() {
    // GIVEN: Valid JSON that is not an object, and invalid JSON
    let inputs = ["[1,2,3]", "\"hello\"", "{not json"];

    for input in inputs {
        // WHEN: Decoding
        let result = ServerFrame::decode(input);

        // THEN: Decode error
        assert!(
            matches!(result, Err(ModelError::Decode { .. })),
            "Expected decode error for {input}"
        );
    }
}

/// **VALUE**: Verifies typed payload extraction for a notice page.
///
/// **WHY THIS MATTERS**: The notification view works on `Vec<Notice>`, not raw JSON.
///
/// **BUG THIS CATCHES**: Would catch serde renames drifting from the backend's PascalCase keys.
#[test]
fn given_notice_page_when_data_as_called_then_returns_typed_notices() {
    // GIVEN: A notice_get response
    let frame = ServerFrame::from_value(json!({
        "action": "notice_get",
        "success": true,
        "config_data": [
            {"ID": 7, "Content": "disk full", "Time": "2024-01-01T00:00:00Z", "ConfirmStat": "UnConfirm", "Level": 2}
        ]
    }))
    .expect("decodes");

    // WHEN: Extracting notices
    let notices: Vec<Notice> = frame.data_as().expect("typed payload");

    // THEN: Fields map, unknown keys are preserved
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].id, 7);
    assert!(notices[0].needs_decision());
    assert_eq!(notices[0].extra.get("Level"), Some(&json!(2)));
}

/// **VALUE**: Verifies that a legacy push carrying an unrecognized `action` still counts as
/// successful.
///
/// **WHY THIS MATTERS**: Such a frame is routed by its `type` tag, so subscribers and
/// one-shot requests must see the same `success` as for a plain `{type, data}` push.
///
/// **BUG THIS CATCHES**: Would catch if any `action` at all disables the legacy default and
/// a normal push is reported as a failure.
#[test]
fn given_legacy_tag_with_unknown_action_when_decoded_then_frame_is_successful() {
    // GIVEN: The same legacy push with and without an unrecognized action
    let plain = ServerFrame::decode(r#"{"type":"task_listen","data":[1]}"#).expect("decodes");
    let mixed = ServerFrame::decode(r#"{"action":"ping","type":"task_listen","data":[1]}"#)
        .expect("decodes");

    // WHEN/THEN: Both are successful with identical payloads
    assert!(plain.success);
    assert!(mixed.success, "Unknown action must not flip a legacy push to failure");
    assert!(mixed.failure_message().is_none());
    assert_eq!(mixed.config_data, plain.config_data);
}

/// **VALUE**: Verifies that a known action without a `success` flag stays a failure even
/// when a `type` tag is present.
///
/// **WHY THIS MATTERS**: Acknowledgements of known actions always carry `success`; one that
/// omits it cannot be assumed to have worked.
///
/// **BUG THIS CATCHES**: Would catch if the legacy default is applied to every tagged frame.
#[test]
fn given_known_action_without_success_when_decoded_then_frame_is_failure() {
    // GIVEN: A config_update acknowledgement missing its flag
    let text = r#"{"action":"config_update","type":"ConfigDB","config_data":[]}"#;

    // WHEN: Decoding
    let frame = ServerFrame::decode(text).expect("decodes");

    // THEN: Not reported as successful
    assert!(!frame.success);
}

/// **VALUE**: Verifies that text or flag fields with the wrong JSON type are treated as
/// absent instead of failing the whole frame.
///
/// **WHY THIS MATTERS**: A numeric `config_type` on an otherwise valid acknowledgement must
/// not cost the subscriber its answer.
///
/// **BUG THIS CATCHES**: Would catch a strict decode that drops the frame on one odd field.
#[test]
fn given_non_string_fields_when_decoded_then_they_are_absent_and_frame_survives() {
    // GIVEN: A config_update acknowledgement with a numeric config_type and message
    let frame = ServerFrame::from_value(json!({
        "action": "config_update",
        "config_type": 5,
        "success": true,
        "message": {"code": 1},
        "config_data": [1]
    }))
    .expect("decodes despite odd field types");

    // THEN: The action and payload are intact, odd fields are dropped
    assert_eq!(frame.action.as_deref(), Some("config_update"));
    assert!(frame.config_type.is_none());
    assert!(frame.message.is_none());
    assert!(frame.success);
    assert_eq!(frame.config_data, json!([1]));
}
