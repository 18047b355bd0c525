use crate::{MASK, mask_sensitive};

use serde_json::json;

/// **VALUE**: Verifies that sensitive keys are masked at every depth.
///
/// **WHY THIS MATTERS**: Agent and KBase configs nest credentials inside sub-objects and
/// arrays; top-level masking alone leaks them.
///
/// **BUG THIS CATCHES**: Would catch if recursion into objects or arrays is dropped.
#[test]
fn given_nested_config_when_masked_then_all_sensitive_values_hidden() {
    // GIVEN: A config with secrets at several levels
    let config = json!({
        "Identity": "agent-1",
        "apiKey": "sk-123",
        "Models": [{"Name": "m", "apiKey": "sk-456"}],
        "Store": {"DSN": "postgres://u:p@h/db", "Driver": "postgres"}
    });

    // WHEN: Masking
    let masked = mask_sensitive(&config);

    // THEN: Secrets replaced, everything else intact
    assert_eq!(masked["apiKey"], json!(MASK));
    assert_eq!(masked["Models"][0]["apiKey"], json!(MASK));
    assert_eq!(masked["Store"]["DSN"], json!(MASK));
    assert_eq!(masked["Store"]["Driver"], json!("postgres"));
    assert_eq!(masked["Identity"], json!("agent-1"));
}
