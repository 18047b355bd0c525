// Unit tests for frame routing

use crate::router::{CONFIG_CHANGED, Discriminator, Route, ServerAction};

use models::ServerFrame;
use serde_json::json;

fn frame(value: serde_json::Value) -> ServerFrame {
    ServerFrame::from_value(value).expect("frame should decode")
}

fn dispatched(route: Route) -> String {
    match route {
        Route::Dispatch(discriminator) => discriminator.as_str().to_string(),
        other => panic!("Expected Dispatch, got {other:?}"),
    }
}

/// **VALUE**: Verifies handshake answers are claimed by the connection task.
///
/// **WHY THIS MATTERS**: Subscribers must never see authentication traffic.
///
/// **BUG THIS CATCHES**: Would catch `authenticate_response` being treated as
/// a generic action with the suffix stripped.
#[test]
fn given_handshake_actions_when_resolved_then_routes_internally() {
    assert_eq!(
        Route::resolve(&frame(json!({"action": "authenticate_response", "success": true}))),
        Route::Handshake
    );
    assert_eq!(
        Route::resolve(&frame(json!({"action": "change_password_response", "success": true}))),
        Route::PasswordChange
    );
}

/// **VALUE**: Verifies create, update and delete answers share one key.
///
/// **WHY THIS MATTERS**: Views refresh on "config changed" regardless of
/// which edit produced it.
///
/// **BUG THIS CATCHES**: Would catch a create or delete acknowledgement that
/// never reaches the refresh handler.
#[test]
fn given_config_mutations_when_resolved_then_collapse_to_config_changed() {
    for action in ["config_create", "config_update", "config_delete", "config_delete_response"] {
        let route = Route::resolve(&frame(
            json!({"action": action, "config_type": "DB", "success": true}),
        ));
        assert_eq!(dispatched(route), CONFIG_CHANGED, "action {action}");
    }
}

#[test]
fn given_config_get_with_type_when_resolved_then_prefixes_config() {
    let route = Route::resolve(&frame(
        json!({"action": "config_get", "config_type": "Meta", "success": true}),
    ));
    assert_eq!(dispatched(route), "ConfigMeta");

    let untyped = Route::resolve(&frame(json!({"action": "config_get", "success": true})));
    assert_eq!(dispatched(untyped), "config_get");
}

/// **VALUE**: Verifies modern and legacy envelopes resolve to the same key.
///
/// **WHY THIS MATTERS**: Older backend builds push `{type, data}` for the
/// same events; subscribers must not care which one arrived.
///
/// **BUG THIS CATCHES**: Would catch legacy frames being dropped as
/// unroutable or getting a different payload.
#[test]
fn given_equivalent_modern_and_legacy_frames_when_resolved_then_same_discriminator() {
    // GIVEN: The same push in both shapes
    let modern = frame(json!({"action": "task_listen", "success": true, "config_data": [1, 2]}));
    let legacy = frame(json!({"type": "task_listen", "data": [1, 2], "timestamp": 5}));

    // WHEN: Resolved
    let modern_route = Route::resolve(&modern);
    let legacy_route = Route::resolve(&legacy);

    // THEN: Same key and payload
    assert_eq!(modern_route, legacy_route);
    assert_eq!(modern.config_data, legacy.config_data);
    assert!(legacy.success);
}

#[test]
fn given_unknown_action_with_config_type_when_resolved_then_uses_config_type() {
    let route = Route::resolve(&frame(
        json!({"action": "something_new", "config_type": "db_config", "success": true}),
    ));
    assert_eq!(dispatched(route), "db_config");
}

#[test]
fn given_frame_without_any_tag_when_resolved_then_unroutable() {
    assert_eq!(
        Route::resolve(&frame(json!({"action": "mystery", "success": true}))),
        Route::Unroutable
    );
    assert_eq!(Route::resolve(&frame(json!({}))), Route::Unroutable);
}

#[test]
fn given_response_suffix_when_parse_then_accepts_non_handshake_actions() {
    assert_eq!(
        ServerAction::parse("notice_get_response"),
        Some(ServerAction::NoticeGet)
    );
    assert_eq!(ServerAction::parse("authenticate"), None);
    assert_eq!(
        Discriminator::from(ServerAction::TaskDo),
        Discriminator::new("task_do")
    );
}
