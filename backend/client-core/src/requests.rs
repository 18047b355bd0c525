//! Typed request builders.
//!
//! Each builder returns the exact envelope the backend expects; the matching
//! [`ConsoleClient`] method sends it. Answers arrive through subscriptions.

use crate::client::ConsoleClient;
use crate::error::CoreError;

use common::ErrorLocation;

use std::panic::Location;

use models::{
    ClientMessage, ClientMessageBuilder, ConfigType, ModelError, Notice, NoticeConfirmStatus,
    NoticeQuery,
};
use serde_json::Value;

pub const CONFIG_GET: &str = "config_get";
pub const CONFIG_GET_ID: &str = "config_get_id";
pub const CONFIG_CREATE: &str = "config_create";
pub const CONFIG_UPDATE: &str = "config_update";
pub const CONFIG_DELETE: &str = "config_delete";
pub const CONFIG_SAVE: &str = "config_save";
pub const NOTICE_GET: &str = "notice_get";
pub const NOTICE_CONFIRM: &str = "notice_confirm";
pub const TASK_LISTEN: &str = "task_listen";
pub const TASK_CLOSE: &str = "task_close";
pub const TASK_DO: &str = "task_do";
pub const TASK_CRON_REFRESH: &str = "task_cron_refresh";

fn typed(action: &str, config_type: &ConfigType) -> ClientMessageBuilder {
    ClientMessageBuilder::default()
        .with_action(action)
        .with_config_type(config_type.as_str())
}

#[track_caller]
fn encode<T: serde::Serialize>(action: &str, value: &T) -> Result<Value, ModelError> {
    serde_json::to_value(value).map_err(|e| ModelError::Validation {
        message: format!("Failed to encode '{action}' payload: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

// ============================================
// BUILDERS
// ============================================

pub fn get_config(config_type: &ConfigType) -> Result<ClientMessage, ModelError> {
    typed(CONFIG_GET, config_type).build()
}

pub fn get_config_ids(config_type: &ConfigType) -> Result<ClientMessage, ModelError> {
    typed(CONFIG_GET_ID, config_type).build()
}

pub fn update_config(config_type: &ConfigType, data: Value) -> Result<ClientMessage, ModelError> {
    typed(CONFIG_UPDATE, config_type)
        .with_config_data(data)
        .build()
}

pub fn create_config(config_type: &ConfigType, data: Value) -> Result<ClientMessage, ModelError> {
    typed(CONFIG_CREATE, config_type)
        .with_config_data(data)
        .build()
}

pub fn delete_config(config_type: &ConfigType, data: Value) -> Result<ClientMessage, ModelError> {
    typed(CONFIG_DELETE, config_type)
        .with_config_data(data)
        .build()
}

pub fn save_config(config_type: &ConfigType, data: Value) -> Result<ClientMessage, ModelError> {
    typed(CONFIG_SAVE, config_type)
        .with_config_data(data)
        .build()
}

/// `page` and `page_size` are 1-based counts.
pub fn get_notices(page: u32, page_size: u32) -> Result<ClientMessage, ModelError> {
    let query = NoticeQuery::new(page, page_size)?;
    ClientMessageBuilder::default()
        .with_action(NOTICE_GET)
        .with_config_data(encode(NOTICE_GET, &query)?)
        .build()
}

/// Sends the whole notice back with its status replaced.
pub fn confirm_notice(
    notice: &Notice,
    status: NoticeConfirmStatus,
) -> Result<ClientMessage, ModelError> {
    let confirmed = notice.with_status(status);
    ClientMessageBuilder::default()
        .with_action(NOTICE_CONFIRM)
        .with_config_data(encode(NOTICE_CONFIRM, &confirmed)?)
        .build()
}

pub fn listen_tasks() -> Result<ClientMessage, ModelError> {
    ClientMessageBuilder::default().with_action(TASK_LISTEN).build()
}

pub fn close_tasks() -> Result<ClientMessage, ModelError> {
    ClientMessageBuilder::default().with_action(TASK_CLOSE).build()
}

#[track_caller]
pub fn run_task(task_name: &str) -> Result<ClientMessage, ModelError> {
    if task_name.trim().is_empty() {
        return Err(ModelError::Validation {
            message: String::from("Task name cannot be empty"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    ClientMessageBuilder::default()
        .with_action(TASK_DO)
        .with_config_data(Value::String(task_name.to_string()))
        .build()
}

pub fn refresh_task_cron() -> Result<ClientMessage, ModelError> {
    ClientMessageBuilder::default()
        .with_action(TASK_CRON_REFRESH)
        .build()
}

// ============================================
// CLIENT METHODS
// ============================================

impl ConsoleClient {
    pub fn get_config(&self, config_type: &ConfigType) -> Result<(), CoreError> {
        self.send_built(get_config(config_type))
    }

    pub fn get_config_ids(&self, config_type: &ConfigType) -> Result<(), CoreError> {
        self.send_built(get_config_ids(config_type))
    }

    pub fn update_config(&self, config_type: &ConfigType, data: Value) -> Result<(), CoreError> {
        self.send_built(update_config(config_type, data))
    }

    pub fn create_config(&self, config_type: &ConfigType, data: Value) -> Result<(), CoreError> {
        self.send_built(create_config(config_type, data))
    }

    pub fn delete_config(&self, config_type: &ConfigType, data: Value) -> Result<(), CoreError> {
        self.send_built(delete_config(config_type, data))
    }

    pub fn save_config(&self, config_type: &ConfigType, data: Value) -> Result<(), CoreError> {
        self.send_built(save_config(config_type, data))
    }

    pub fn get_notices(&self, page: u32, page_size: u32) -> Result<(), CoreError> {
        self.send_built(get_notices(page, page_size))
    }

    pub fn confirm_notice(
        &self,
        notice: &Notice,
        status: NoticeConfirmStatus,
    ) -> Result<(), CoreError> {
        self.send_built(confirm_notice(notice, status))
    }

    pub fn listen_tasks(&self) -> Result<(), CoreError> {
        self.send_built(listen_tasks())
    }

    pub fn close_tasks(&self) -> Result<(), CoreError> {
        self.send_built(close_tasks())
    }

    pub fn run_task(&self, task_name: &str) -> Result<(), CoreError> {
        self.send_built(run_task(task_name))
    }

    pub fn refresh_task_cron(&self) -> Result<(), CoreError> {
        self.send_built(refresh_task_cron())
    }

    fn send_built(&self, message: Result<ClientMessage, ModelError>) -> Result<(), CoreError> {
        self.send(message?)?;
        Ok(())
    }
}
