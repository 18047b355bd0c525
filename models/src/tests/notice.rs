use crate::{ModelError, Notice, NoticeConfirmStatus, NoticeQuery};

use serde_json::{Map, json};

/// **VALUE**: Verifies that page numbers start at 1.
///
/// **WHY THIS MATTERS**: The backend computes offsets as `(page - 1) * page_size`; page 0
/// underflows server-side.
///
/// **BUG THIS CATCHES**: Would catch if the zero checks are removed.
#[test]
fn given_zero_page_or_size_when_creating_query_then_returns_validation_error() {
    // GIVEN/WHEN: Zero page and zero size
    let zero_page = NoticeQuery::new(0, 10);
    let zero_size = NoticeQuery::new(1, 0);

    // THEN: Both rejected, valid query accepted
    assert!(matches!(zero_page, Err(ModelError::Validation { .. })));
    assert!(matches!(zero_size, Err(ModelError::Validation { .. })));
    assert_eq!(
        NoticeQuery::new(2, 20).expect("valid"),
        NoticeQuery { page: 2, page_size: 20 }
    );
}

/// **VALUE**: Verifies that a status change keeps every other field, including extras.
///
/// **WHY THIS MATTERS**: `notice_confirm` sends the whole notice back; losing fields would
/// overwrite server state.
///
/// **BUG THIS CATCHES**: Would catch if `with_status` rebuilds the notice from known fields only.
#[test]
fn given_notice_when_status_changed_then_other_fields_are_kept() {
    // GIVEN: An unread notice with an extra field
    let mut extra = Map::new();
    extra.insert("Source".to_string(), json!("inspector-3"));
    let notice = Notice {
        id: 3,
        content: "slow query".to_string(),
        time: "2024-05-01T10:00:00Z".to_string(),
        confirm_stat: NoticeConfirmStatus::Unread,
        extra,
    };

    // WHEN: Marking it read
    let read = notice.with_status(NoticeConfirmStatus::Read);

    // THEN: Only the status differs
    let encoded = serde_json::to_value(&read).expect("serializes");
    assert_eq!(encoded["ConfirmStat"], json!("Read"));
    assert_eq!(encoded["ID"], json!(3));
    assert_eq!(encoded["Source"], json!("inspector-3"));
}
