//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const ENV_PASSWORD: &str = "INSPECTOR_PASSWORD";

#[derive(Debug, Parser)]
#[command(
    name = "inspector-console",
    version,
    about = "Operator console for the database inspection backend"
)]
pub struct Cli {
    /// Directory holding console.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Backend WebSocket URL, overriding config and environment
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Directory for the log file (defaults to the config dir)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Seconds to wait for each server answer
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct Login {
    #[arg(long, short)]
    pub username: String,

    #[arg(long, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one page of notices
    Notices {
        #[command(flatten)]
        login: Login,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    /// Print scheduled task status
    Tasks {
        #[command(flatten)]
        login: Login,
        /// Keep streaming updates until Ctrl-C
        #[arg(long)]
        watch: bool,
    },

    /// Run a task now
    RunTask {
        #[command(flatten)]
        login: Login,
        name: String,
    },

    /// Print the identifiers of one config type (Log, DB, Alert, ...)
    ConfigIds {
        #[command(flatten)]
        login: Login,
        config_type: String,
    },

    /// Rotate the login password
    ChangePassword {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        new_password: String,
    },

    /// Write a default console.toml
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
