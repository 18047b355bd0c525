use crate::error::model_error::ModelError;
use crate::server_action::ServerAction;

use common::ErrorLocation;

use std::panic::Location;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Every field either inbound shape may carry.
///
/// Only used as the serde target; callers see [`ServerFrame`]. Text and flag
/// fields holding a value of the wrong JSON type decode as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireFrame {
    #[serde(deserialize_with = "string_or_none")]
    action: Option<String>,
    #[serde(deserialize_with = "string_or_none")]
    config_type: Option<String>,
    #[serde(deserialize_with = "bool_or_none")]
    success: Option<bool>,
    #[serde(deserialize_with = "string_or_none")]
    message: Option<String>,
    #[serde(deserialize_with = "string_or_none")]
    error: Option<String>,
    config_data: Option<Value>,
    #[serde(rename = "type", deserialize_with = "string_or_none")]
    kind: Option<String>,
    data: Option<Value>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(Some(text)),
        _ => Ok(None),
    }
}

fn bool_or_none<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => Ok(Some(flag)),
        _ => Ok(None),
    }
}

/// Decoded inbound frame.
///
/// Both the `{action, config_type, success, message, config_data}` envelope
/// and the legacy `{type, data}` envelope land here:
///
/// - legacy frames keep their tag in `kind` and move `data` into
///   `config_data`; without a `success` flag they count as successful unless
///   `action` names a known [`ServerAction`]
/// - a failure text sent as `error` is folded into `message`
/// - an absent payload is `Value::Null`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerFrame {
    pub action: Option<String>,
    pub kind: Option<String>,
    pub config_type: Option<String>,
    pub success: bool,
    pub message: Option<String>,
    pub config_data: Value,
}

impl ServerFrame {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Decode`] if the text is not a JSON object.
    #[track_caller]
    pub fn decode(text: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ModelError::Decode {
            message: format!("Frame is not valid JSON: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value.
    #[track_caller]
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        if !value.is_object() {
            return Err(ModelError::Decode {
                message: format!("Frame must be a JSON object, got: {value}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let wire: WireFrame = serde_json::from_value(value).map_err(|e| ModelError::Decode {
            message: format!("Frame has unexpected field types: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(wire.into())
    }

    /// Server-supplied diagnostic for a failed frame.
    pub fn failure_message(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            Some(self.message.as_deref().unwrap_or("request failed"))
        }
    }

    /// Deserialize `config_data` into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Decode`] if the payload has a different shape.
    #[track_caller]
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ModelError> {
        serde_json::from_value(self.config_data.clone()).map_err(|e| ModelError::Decode {
            message: format!(
                "Unexpected config_data for {}: {e}",
                self.action
                    .as_deref()
                    .or(self.kind.as_deref())
                    .unwrap_or("untagged frame")
            ),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl From<WireFrame> for ServerFrame {
    fn from(wire: WireFrame) -> Self {
        let known_action = wire
            .action
            .as_deref()
            .and_then(ServerAction::parse)
            .is_some();
        let legacy = wire.kind.is_some() && !known_action;

        let config_data = match (wire.config_data, wire.data) {
            (Some(config_data), _) => config_data,
            (None, Some(data)) => data,
            (None, None) => Value::Null,
        };

        Self {
            action: wire.action,
            kind: wire.kind,
            config_type: wire.config_type,
            success: wire.success.unwrap_or(legacy),
            message: wire.message.or(wire.error),
            config_data,
        }
    }
}
