use crate::error::model_error::ModelError;
use crate::masking::{MASK, mask_sensitive};

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound request envelope.
///
/// `action` is always present and non-empty; every other field is
/// operation-specific and omitted from the JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_password: Option<String>,
}

impl ClientMessage {
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn config_type(&self) -> Option<&str> {
        self.config_type.as_deref()
    }

    pub fn config_data(&self) -> Option<&Value> {
        self.config_data.as_ref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn old_password(&self) -> Option<&str> {
        self.old_password.as_deref()
    }

    pub fn new_password(&self) -> Option<&str> {
        self.new_password.as_deref()
    }

    /// Serialize to the newline-free JSON text sent on the wire.
    #[track_caller]
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(|e| ModelError::Validation {
            message: format!("Failed to encode '{}' message: {e}", self.action),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// JSON rendering safe for logs.
    ///
    /// Credentials are replaced with [`MASK`] and sensitive config fields are
    /// masked recursively.
    pub fn masked_json(&self) -> String {
        let mut copy = self.clone();
        if copy.auth_token.is_some() {
            copy.auth_token = Some(MASK.to_string());
        }
        if copy.old_password.is_some() {
            copy.old_password = Some(MASK.to_string());
        }
        if copy.new_password.is_some() {
            copy.new_password = Some(MASK.to_string());
        }
        copy.config_data = copy.config_data.as_ref().map(mask_sensitive);

        serde_json::to_string(&copy).unwrap_or_else(|_| format!("{{\"action\":\"{}\"}}", self.action))
    }
}

/// Builder for validated [`ClientMessage`] instances.
#[derive(Debug, Default)]
pub struct ClientMessageBuilder {
    action: Option<String>,
    config_type: Option<String>,
    config_data: Option<Value>,
    auth_token: Option<String>,
    old_password: Option<String>,
    new_password: Option<String>,
}

impl ClientMessageBuilder {
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_config_type(mut self, config_type: impl Into<String>) -> Self {
        self.config_type = Some(config_type.into());
        self
    }

    pub fn with_config_data(mut self, config_data: Value) -> Self {
        self.config_data = Some(config_data);
        self
    }

    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    pub fn with_password_change(
        mut self,
        old_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Self {
        self.old_password = Some(old_password.into());
        self.new_password = Some(new_password.into());
        self
    }

    /// Build the message with validation.
    #[track_caller]
    pub fn build(self) -> Result<ClientMessage, ModelError> {
        let action = self.action.ok_or_else(|| ModelError::Validation {
            message: String::from("Action is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if action.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Action cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.config_type.as_deref() == Some("") {
            return Err(ModelError::Validation {
                message: format!("Config type cannot be empty for action '{action}'"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(ClientMessage {
            action,
            config_type: self.config_type,
            config_data: self.config_data,
            auth_token: self.auth_token,
            old_password: self.old_password,
            new_password: self.new_password,
        })
    }
}
