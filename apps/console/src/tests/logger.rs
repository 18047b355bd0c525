// Unit tests for logger module initialization logic
// Tests focus on thread-safety and error handling

use crate::logger::{LOG_FILE_NAME, LOG_LEVEL, initialize};

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: The binary and tests may both initialize logging. If
/// the second call errors, the console fails on startup.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when setting a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path(), LOG_LEVEL);
    let result2 = initialize(temp_dir.path(), LOG_LEVEL);

    // THEN: Both return Ok, and the first created the log file
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
    assert!(temp_dir.path().join(LOG_FILE_NAME).exists());
}
