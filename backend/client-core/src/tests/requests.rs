// Unit tests for typed request builders

use crate::requests::{
    close_tasks, confirm_notice, create_config, delete_config, get_config, get_config_ids,
    get_notices, listen_tasks, refresh_task_cron, run_task, save_config, update_config,
};

use models::{ConfigType, ModelError, Notice, NoticeConfirmStatus};
use serde_json::{Value, json};

fn wire(message: &models::ClientMessage) -> Value {
    serde_json::from_str(&message.to_json().expect("message should encode"))
        .expect("encoded message should be JSON")
}

/// **VALUE**: Verifies the config builders produce the backend's envelopes.
///
/// **WHY THIS MATTERS**: The backend dispatches on exact action strings and
/// field names; a typo silently does nothing.
///
/// **BUG THIS CATCHES**: Would catch a wrong action name, a wrong config_type
/// string, or an unset payload being serialized as null.
#[test]
fn given_config_builders_when_encoded_then_match_wire_envelopes() {
    let data = json!({"id": 7, "DSN": "user:pw@tcp(db)/x"});

    assert_eq!(
        wire(&get_config(&ConfigType::Meta).unwrap()),
        json!({"action": "config_get", "config_type": "Meta"})
    );
    assert_eq!(
        wire(&get_config_ids(&ConfigType::Db).unwrap()),
        json!({"action": "config_get_id", "config_type": "DB"})
    );
    assert_eq!(
        wire(&update_config(&ConfigType::Alert, data.clone()).unwrap()),
        json!({"action": "config_update", "config_type": "Alert", "config_data": data})
    );
    assert_eq!(
        wire(&create_config(&ConfigType::Task, data.clone()).unwrap()),
        json!({"action": "config_create", "config_type": "Task", "config_data": data})
    );
    assert_eq!(
        wire(&delete_config(&ConfigType::KBase, data.clone()).unwrap()),
        json!({"action": "config_delete", "config_type": "KBase", "config_data": data})
    );
    assert_eq!(
        wire(&save_config(&ConfigType::Log, data.clone()).unwrap()),
        json!({"action": "config_save", "config_type": "Log", "config_data": data})
    );
}

#[test]
fn given_page_when_get_notices_then_sends_page_query() {
    let message = get_notices(2, 20).unwrap();

    assert_eq!(
        wire(&message),
        json!({"action": "notice_get", "config_data": {"page": 2, "page_size": 20}})
    );
}

/// **VALUE**: Verifies zero pages are rejected before reaching the wire.
///
/// **BUG THIS CATCHES**: Would catch an unvalidated query the backend
/// answers with an empty page.
#[test]
fn given_zero_page_when_get_notices_then_validation_error() {
    assert!(matches!(get_notices(0, 10), Err(ModelError::Validation { .. })));
    assert!(matches!(get_notices(1, 0), Err(ModelError::Validation { .. })));
}

/// **VALUE**: Verifies a confirmed notice goes back whole with the new status.
///
/// **WHY THIS MATTERS**: The backend replaces the stored notice with the
/// payload; dropping unknown fields would lose data.
///
/// **BUG THIS CATCHES**: Would catch the status not being replaced, or extra
/// fields being lost.
#[test]
fn given_notice_when_confirm_notice_then_sends_notice_with_status() {
    // GIVEN: A notice awaiting a decision with an unmodelled field
    let notice: Notice = serde_json::from_value(json!({
        "ID": 3,
        "Content": "Drop table?",
        "Time": "2024-05-01 10:00:00",
        "ConfirmStat": "UnConfirm",
        "Source": "inspector"
    }))
    .unwrap();

    // WHEN: Allowed
    let message = confirm_notice(&notice, NoticeConfirmStatus::Allow).unwrap();

    // THEN: Same notice, new status
    let payload = wire(&message);
    assert_eq!(payload["action"], "notice_confirm");
    assert_eq!(payload["config_data"]["ID"], 3);
    assert_eq!(payload["config_data"]["ConfirmStat"], "Allow");
    assert_eq!(payload["config_data"]["Source"], "inspector");
}

#[test]
fn given_task_builders_when_encoded_then_match_wire_envelopes() {
    assert_eq!(wire(&listen_tasks().unwrap()), json!({"action": "task_listen"}));
    assert_eq!(wire(&close_tasks().unwrap()), json!({"action": "task_close"}));
    assert_eq!(
        wire(&run_task("nightly-check").unwrap()),
        json!({"action": "task_do", "config_data": "nightly-check"})
    );
    assert_eq!(
        wire(&refresh_task_cron().unwrap()),
        json!({"action": "task_cron_refresh"})
    );
    assert!(run_task("  ").is_err());
}
