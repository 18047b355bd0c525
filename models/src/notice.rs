//! Operator notifications.

use crate::error::model_error::ModelError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Confirmation state of a notice.
///
/// `UnConfirm` notices ask the operator for a decision (`Allow` / `NotAllow`);
/// every other notice only moves from `Unread` to `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeConfirmStatus {
    Unread,
    Read,
    UnConfirm,
    Allow,
    NotAllow,
}

/// A notice as listed by `notice_get`.
///
/// Fields the console does not model are kept in `extra` so a confirmed notice
/// goes back to the server unchanged apart from its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notice {
    #[serde(rename = "ID")]
    pub id: i64,
    pub content: String,
    pub time: String,
    pub confirm_stat: NoticeConfirmStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notice {
    pub fn needs_decision(&self) -> bool {
        self.confirm_stat == NoticeConfirmStatus::UnConfirm
    }

    /// Copy of this notice carrying a new confirmation status.
    pub fn with_status(&self, status: NoticeConfirmStatus) -> Self {
        Self {
            confirm_stat: status,
            ..self.clone()
        }
    }
}

/// Page selector sent as the `config_data` of `notice_get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeQuery {
    pub page: u32,
    pub page_size: u32,
}

impl NoticeQuery {
    /// Pages are 1-based and must hold at least one notice.
    #[track_caller]
    pub fn new(page: u32, page_size: u32) -> Result<Self, ModelError> {
        if page == 0 {
            return Err(ModelError::Validation {
                message: String::from("Page must be at least 1"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if page_size == 0 {
            return Err(ModelError::Validation {
                message: String::from("Page size must be at least 1"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { page, page_size })
    }
}
