// Unit tests for argument parsing

use crate::cli::{Cli, Command};

use clap::{CommandFactory, Parser};

#[test]
fn given_cli_definition_when_debug_asserted_then_valid() {
    Cli::command().debug_assert();
}

/// **VALUE**: Verifies global flags are accepted after the subcommand.
///
/// **BUG THIS CATCHES**: Would catch `--url` losing `global = true`, which
/// breaks the documented `inspector-console notices --url ...` form.
#[test]
fn given_notices_with_global_flags_when_parsed_then_fields_set() {
    // GIVEN/WHEN: Flags on both sides of the subcommand
    let cli = Cli::try_parse_from([
        "inspector-console",
        "--config-dir",
        "/tmp/console",
        "notices",
        "-u",
        "admin",
        "--password",
        "secret",
        "--page",
        "3",
        "--url",
        "ws://10.0.0.2:8899",
    ])
    .unwrap();

    // THEN: Everything lands where expected
    assert_eq!(cli.url.as_deref(), Some("ws://10.0.0.2:8899"));
    assert_eq!(cli.config_dir.as_deref(), Some(std::path::Path::new("/tmp/console")));
    match cli.command {
        Command::Notices {
            login,
            page,
            page_size,
        } => {
            assert_eq!(login.username, "admin");
            assert_eq!(login.password, "secret");
            assert_eq!(page, 3);
            assert_eq!(page_size, 20);
        }
        other => panic!("Expected Notices, got {other:?}"),
    }
}

#[test]
fn given_run_task_when_parsed_then_name_positional() {
    let cli = Cli::try_parse_from([
        "inspector-console",
        "run-task",
        "--username",
        "admin",
        "--password",
        "secret",
        "nightly-check",
    ])
    .unwrap();

    assert!(matches!(cli.command, Command::RunTask { ref name, .. } if name == "nightly-check"));
}

#[test]
fn given_init_config_when_parsed_then_no_login_required() {
    let cli = Cli::try_parse_from(["inspector-console", "init-config", "--force"]).unwrap();

    assert!(matches!(cli.command, Command::InitConfig { force: true }));
}
