//! Closed set of actions the backend acknowledges.

use std::fmt;

const RESPONSE_SUFFIX: &str = "_response";

/// Actions the backend answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerAction {
    Authenticate,
    ChangePassword,
    ConfigGet,
    ConfigGetId,
    ConfigCreate,
    ConfigUpdate,
    ConfigDelete,
    ConfigSave,
    NoticeGet,
    NoticeConfirm,
    TaskListen,
    TaskClose,
    TaskDo,
    TaskCronRefresh,
}

impl ServerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ServerAction::Authenticate => "authenticate",
            ServerAction::ChangePassword => "change_password",
            ServerAction::ConfigGet => "config_get",
            ServerAction::ConfigGetId => "config_get_id",
            ServerAction::ConfigCreate => "config_create",
            ServerAction::ConfigUpdate => "config_update",
            ServerAction::ConfigDelete => "config_delete",
            ServerAction::ConfigSave => "config_save",
            ServerAction::NoticeGet => "notice_get",
            ServerAction::NoticeConfirm => "notice_confirm",
            ServerAction::TaskListen => "task_listen",
            ServerAction::TaskClose => "task_close",
            ServerAction::TaskDo => "task_do",
            ServerAction::TaskCronRefresh => "task_cron_refresh",
        }
    }

    /// Parse an inbound `action`.
    ///
    /// Handshake answers are only recognized in their `_response` form; every
    /// other action is accepted with or without the suffix.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "authenticate_response" => return Some(ServerAction::Authenticate),
            "change_password_response" => return Some(ServerAction::ChangePassword),
            _ => {}
        }

        let base = action.strip_suffix(RESPONSE_SUFFIX).unwrap_or(action);
        match base {
            "config_get" => Some(ServerAction::ConfigGet),
            "config_get_id" => Some(ServerAction::ConfigGetId),
            "config_create" => Some(ServerAction::ConfigCreate),
            "config_update" => Some(ServerAction::ConfigUpdate),
            "config_delete" => Some(ServerAction::ConfigDelete),
            "config_save" => Some(ServerAction::ConfigSave),
            "notice_get" => Some(ServerAction::NoticeGet),
            "notice_confirm" => Some(ServerAction::NoticeConfirm),
            "task_listen" => Some(ServerAction::TaskListen),
            "task_close" => Some(ServerAction::TaskClose),
            "task_do" => Some(ServerAction::TaskDo),
            "task_cron_refresh" => Some(ServerAction::TaskCronRefresh),
            _ => None,
        }
    }
}

impl fmt::Display for ServerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
