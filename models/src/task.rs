//! Scheduled task run status pushed by `task_listen`.

use serde::{Deserialize, Serialize};

/// Timestamp the backend reports for "never".
const NEVER: &str = "0001-01-01T00:00:00Z";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStatus {
    #[serde(rename = "UUID")]
    pub uuid: String,
    pub task_name: String,
    #[serde(default)]
    pub next_start: String,
    #[serde(default)]
    pub last_start: String,
}

impl TaskStatus {
    pub fn next_start(&self) -> Option<&str> {
        real_time(&self.next_start)
    }

    pub fn last_start(&self) -> Option<&str> {
        real_time(&self.last_start)
    }
}

fn real_time(value: &str) -> Option<&str> {
    if value.is_empty() || value == NEVER {
        None
    } else {
        Some(value)
    }
}
