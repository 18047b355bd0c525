use client_core::config::{CONFIG_FILE_NAME, ClientConfig};
use client_core::error::config::ConfigError;

use tempfile::TempDir;

/// **VALUE**: Verifies parse errors name the offending file.
///
/// **WHY THIS MATTERS**: Operators edit `console.toml` by hand; the error must
/// say which file to fix.
///
/// **BUG THIS CATCHES**: Would catch the path being dropped from the message.
#[test]
fn given_corrupt_file_when_load_then_error_names_path() {
    // GIVEN: A corrupt config file
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "version = \"one\"").unwrap();

    // WHEN: Loading
    let err = ClientConfig::load(dir.path()).unwrap_err();

    // THEN: Parse error naming the file
    assert!(matches!(err, ConfigError::ParseError { .. }));
    let error_string = err.to_string();
    assert!(error_string.contains("Config Parse Error"));
    assert!(error_string.contains(CONFIG_FILE_NAME));
}

#[test]
fn given_invalid_values_in_file_when_load_then_validation_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[reconnect]\ndelays_ms = []\n",
    )
    .unwrap();

    let err = ClientConfig::load(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::ValidationError { .. }));
}
