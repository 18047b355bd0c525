//! Resource classes the backend manages.

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// Names the resource class an action applies to (`config_type` on the wire).
///
/// `Meta` and `Index` are query-only: they select the schema metadata and the
/// identity index for `config_get`. Unknown names round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConfigType {
    Log,
    Db,
    Alert,
    Task,
    Agent,
    AgentTask,
    KBase,
    Inspector,
    Meta,
    Index,
    Other(String),
}

impl ConfigType {
    /// Editable resource classes, in the order the console lists them.
    pub const EDITABLE: [ConfigType; 8] = [
        ConfigType::Log,
        ConfigType::Db,
        ConfigType::Alert,
        ConfigType::Task,
        ConfigType::Agent,
        ConfigType::AgentTask,
        ConfigType::KBase,
        ConfigType::Inspector,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ConfigType::Log => "Log",
            ConfigType::Db => "DB",
            ConfigType::Alert => "Alert",
            ConfigType::Task => "Task",
            ConfigType::Agent => "Agent",
            ConfigType::AgentTask => "AgentTask",
            ConfigType::KBase => "KBase",
            ConfigType::Inspector => "Inspector",
            ConfigType::Meta => "Meta",
            ConfigType::Index => "Index",
            ConfigType::Other(name) => name,
        }
    }
}

impl From<&str> for ConfigType {
    fn from(name: &str) -> Self {
        match name {
            "Log" => ConfigType::Log,
            "DB" => ConfigType::Db,
            "Alert" => ConfigType::Alert,
            "Task" => ConfigType::Task,
            "Agent" => ConfigType::Agent,
            "AgentTask" => ConfigType::AgentTask,
            "KBase" => ConfigType::KBase,
            "Inspector" => ConfigType::Inspector,
            "Meta" => ConfigType::Meta,
            "Index" => ConfigType::Index,
            other => ConfigType::Other(other.to_string()),
        }
    }
}

impl From<String> for ConfigType {
    fn from(name: String) -> Self {
        ConfigType::from(name.as_str())
    }
}

impl From<ConfigType> for String {
    fn from(config_type: ConfigType) -> Self {
        config_type.as_str().to_string()
    }
}

impl Display for ConfigType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}
