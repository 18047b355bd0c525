use inspector_console::cli::Cli;
use inspector_console::commands::{resolve_config_dir, run};
use inspector_console::error::ConsoleError;
use inspector_console::logger::{LOG_LEVEL, initialize as LoggerInitialize};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: Cli) -> Result<(), ConsoleError> {
    let log_dir = match &cli.log_dir {
        Some(dir) => dir.clone(),
        None => resolve_config_dir(&cli)?,
    };

    create_dir_all(&log_dir).map_err(|e| ConsoleError::Console {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LOG_LEVEL
    };
    LoggerInitialize(&log_dir, level)?;

    info!("Inspector console starting");
    info!("Log directory: {}", log_dir.display());

    run(cli).await
}
