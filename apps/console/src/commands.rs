//! Subcommand execution.
//!
//! Every networked subcommand opens one authenticated session, issues its
//! request, waits for the matching answer and disconnects.

use crate::cli::{Cli, Command, Login};
use crate::error::ConsoleError;

use client_core::ConsoleClient;
use client_core::config::{CONFIG_FILE_NAME, ClientConfig};
use client_core::error::CoreError;
use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use models::{ConfigType, Notice, ServerFrame, TaskStatus};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

/// Config directory from `--config-dir`, else the platform default.
pub fn resolve_config_dir(cli: &Cli) -> Result<PathBuf, ConsoleError> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(ClientConfig::default_dir()?),
    }
}

/// File, `.env` and environment layers, then `--url` on top.
pub fn resolve_config(config_dir: &Path, url: Option<&str>) -> Result<ClientConfig, ConsoleError> {
    let mut config = ClientConfig::load_layered(config_dir)?;
    if let Some(url) = url {
        debug!("Server URL overridden by --url: {}", url);
        config.connection.url = url.to_string();
        config.validate()?;
    }
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), ConsoleError> {
    let config_dir = resolve_config_dir(&cli)?;
    let wait = Duration::from_secs(cli.timeout_secs);

    if let Command::InitConfig { force } = &cli.command {
        let path = init_config(&config_dir, cli.url.as_deref(), *force)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = resolve_config(&config_dir, cli.url.as_deref())?;
    info!("Using backend {}", config.connection.url);

    match cli.command {
        Command::Notices {
            login,
            page,
            page_size,
        } => {
            let client = open_session(config, &login, wait).await?;
            let result = notices(&client, page, page_size, wait).await;
            finish(&client, result).await
        }
        Command::Tasks { login, watch } => {
            let client = open_session(config, &login, wait).await?;
            let result = tasks(&client, watch, wait).await;
            finish(&client, result).await
        }
        Command::RunTask { login, name } => {
            let client = open_session(config, &login, wait).await?;
            let result = run_task(&client, &name, wait).await;
            finish(&client, result).await
        }
        Command::ConfigIds { login, config_type } => {
            let client = open_session(config, &login, wait).await?;
            let result = config_ids(&client, &ConfigType::from(config_type), wait).await;
            finish(&client, result).await
        }
        Command::ChangePassword {
            login,
            new_password,
        } => {
            let client = open_session(config, &login, wait).await?;
            let result = client
                .change_password(&login.password, &new_password)
                .await
                .map_err(ConsoleError::from)
                .map(|()| println!("Password changed"));
            finish(&client, result).await
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

/// Write the default config (with `url` applied) unless one exists.
pub fn init_config(
    config_dir: &Path,
    url: Option<&str>,
    force: bool,
) -> Result<PathBuf, ConsoleError> {
    let path = config_dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(ConsoleError::Console {
            message: format!("{} already exists (use --force)", path.display()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut config = ClientConfig::default();
    if let Some(url) = url {
        config.connection.url = url.to_string();
    }
    config.save(config_dir)?;
    Ok(path)
}

async fn open_session(
    config: ClientConfig,
    login: &Login,
    wait: Duration,
) -> Result<ConsoleClient, ConsoleError> {
    let client = ConsoleClient::new(config);
    let connected = timeout(wait, client.connect_with_auth(&login.username, &login.password)).await;

    match connected {
        Ok(Ok(())) => Ok(client),
        Ok(Err(e)) => {
            disconnect_quietly(&client).await;
            Err(e.into())
        }
        Err(_) => {
            disconnect_quietly(&client).await;
            Err(ConsoleError::Timeout {
                message: format!("No authenticated connection within {}s", wait.as_secs()),
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}

async fn finish(client: &ConsoleClient, result: Result<(), ConsoleError>) -> Result<(), ConsoleError> {
    client.disconnect().await?;
    result
}

async fn disconnect_quietly(client: &ConsoleClient) {
    if let Err(e) = client.disconnect().await {
        warn!("Disconnect failed: {}", e);
    }
}

/// Send one request and wait for the first frame routed to `discriminator`.
///
/// # Errors
///
/// - [`ConsoleError::Timeout`] if nothing arrives within `wait`
/// - [`ConsoleError::Server`] if the answer has `success = false`
pub async fn request(
    client: &ConsoleClient,
    discriminator: &str,
    send: impl FnOnce(&ConsoleClient) -> Result<(), CoreError>,
    wait: Duration,
) -> Result<ServerFrame, ConsoleError> {
    let (tx, rx) = oneshot::channel();
    let slot = Mutex::new(Some(tx));
    let subscription = client.subscribe(discriminator, move |frame| {
        if let Some(tx) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            let _ = tx.send(frame.clone());
        }
    });

    let outcome = match send(client) {
        Err(e) => Err(ConsoleError::from(e)),
        Ok(()) => match timeout(wait, rx).await {
            Ok(Ok(frame)) => Ok(frame),
            Ok(Err(_)) => Err(ConsoleError::Console {
                message: format!("Subscription for '{discriminator}' ended"),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => Err(ConsoleError::Timeout {
                message: format!("No '{discriminator}' answer within {}s", wait.as_secs()),
                location: ErrorLocation::from(Location::caller()),
            }),
        },
    };
    subscription.cancel();

    let frame = outcome?;
    if let Some(message) = frame.failure_message() {
        return Err(ConsoleError::Server {
            message: message.to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(frame)
}

// ============================================
// SUBCOMMANDS
// ============================================

async fn notices(
    client: &ConsoleClient,
    page: u32,
    page_size: u32,
    wait: Duration,
) -> Result<(), ConsoleError> {
    let frame = request(client, "notice_get", |c| c.get_notices(page, page_size), wait).await?;
    let notices: Vec<Notice> = frame.data_as()?;

    if notices.is_empty() {
        println!("No notices on page {page}");
    }
    for notice in &notices {
        println!("{}", format_notice(notice));
    }
    Ok(())
}

async fn tasks(client: &ConsoleClient, watch: bool, wait: Duration) -> Result<(), ConsoleError> {
    if !watch {
        let frame = request(client, "task_listen", ConsoleClient::listen_tasks, wait).await;
        client.close_tasks()?;
        print_tasks(&frame?)?;
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = client.subscribe("task_listen", move |frame| {
        let _ = tx.send(frame.clone());
    });
    client.listen_tasks()?;
    info!("Watching task status, Ctrl-C to stop");

    let result = loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(frame) => {
                    if let Some(message) = frame.failure_message() {
                        warn!("Task status push failed: {}", message);
                        continue;
                    }
                    if let Err(e) = print_tasks(&frame) {
                        break Err(e);
                    }
                }
                None => break Ok(()),
            },
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    subscription.cancel();
    client.close_tasks()?;
    result
}

async fn run_task(client: &ConsoleClient, name: &str, wait: Duration) -> Result<(), ConsoleError> {
    let frame = request(client, "task_do", |c| c.run_task(name), wait).await?;
    match frame.message.as_deref() {
        Some(message) if !message.is_empty() => println!("{message}"),
        _ => println!("Task '{name}' started"),
    }
    Ok(())
}

async fn config_ids(
    client: &ConsoleClient,
    config_type: &ConfigType,
    wait: Duration,
) -> Result<(), ConsoleError> {
    let frame = request(
        client,
        "config_get_id",
        |c| c.get_config_ids(config_type),
        wait,
    )
    .await?;

    let rendered = serde_json::to_string_pretty(&frame.config_data).map_err(|e| {
        ConsoleError::Console {
            message: format!("Failed to render identifiers: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;
    println!("{rendered}");
    Ok(())
}

fn print_tasks(frame: &ServerFrame) -> Result<(), ConsoleError> {
    let tasks: Vec<TaskStatus> = frame.data_as()?;
    for task in &tasks {
        println!("{}", format_task(task));
    }
    Ok(())
}

// ============================================
// FORMATTING
// ============================================

pub fn format_notice(notice: &Notice) -> String {
    let marker = if notice.needs_decision() { "!" } else { " " };
    format!(
        "{marker} #{id:<6} {time:<20} {status:<10} {content}",
        id = notice.id,
        time = notice.time,
        status = format!("{:?}", notice.confirm_stat),
        content = notice.content,
    )
}

pub fn format_task(task: &TaskStatus) -> String {
    format!(
        "{name:<24} next: {next:<22} last: {last}",
        name = task.task_name,
        next = task.next_start().unwrap_or("-"),
        last = task.last_start().unwrap_or("never"),
    )
}
