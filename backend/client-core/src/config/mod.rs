//! Client configuration.
//!
//! Resolution order, lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. `console.toml` in the config directory
//! 3. `.env` (loaded into the process environment, never fatal)
//! 4. `INSPECTOR_WS_URL`
//! 5. command-line overrides applied by the binary

use crate::DEFAULT_WS_URL;
use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE_NAME: &str = "console.toml";
pub const CONFIG_DIR_NAME: &str = "inspector-console";
pub const ENV_WS_URL: &str = "INSPECTOR_WS_URL";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub handshake_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_ms: default_timeout_ms(),
            handshake_timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_delays_ms")]
    pub delays_ms: Vec<u64>,
    #[serde(default = "default_max_auth_attempts")]
    pub max_auth_attempts: u32,
    /// Keep retrying with the same credentials after the server rejected them.
    #[serde(default = "default_retry_after_auth_failure")]
    pub retry_after_auth_failure: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delays_ms: default_delays_ms(),
            max_auth_attempts: default_max_auth_attempts(),
            retry_after_auth_failure: default_retry_after_auth_failure(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            connection: ConnectionConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_url() -> String {
    DEFAULT_WS_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_delays_ms() -> Vec<u64> {
    vec![1_000, 3_000, 5_000, 10_000]
}
fn default_max_auth_attempts() -> u32 {
    5
}
fn default_retry_after_auth_failure() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Platform config directory, e.g. `~/.config/inspector-console`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if the platform has no config directory.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
                reason: "Platform has no config directory".to_string(),
            })
    }

    /// Load config from {config_dir}/console.toml.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read, parsed or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: ClientConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Load the file, then layer `.env` and `INSPECTOR_WS_URL` on top.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::load`], plus [`ConfigError::EnvironmentError`]
    /// for an unusable override.
    pub fn load_layered(config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(config_dir)?;
        try_load_dotenv();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `INSPECTOR_WS_URL` if it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvironmentError`] if the value is not a WebSocket URL.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let Ok(url) = std::env::var(ENV_WS_URL) else {
            return Ok(());
        };

        validate_ws_url(&url).map_err(|reason| ConfigError::EnvironmentError {
            location: ErrorLocation::from(Location::caller()),
            variable: ENV_WS_URL.to_string(),
            reason,
        })?;

        debug!("Server URL overridden by {}: {}", ENV_WS_URL, url);
        self.connection.url = url;
        Ok(())
    }

    /// Save config to {config_dir}/console.toml using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, serialization, or the write fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let contents = toml::to_string_pretty(self)?;

        std::fs::write(&temp_path, contents).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        validate_ws_url(&self.connection.url).map_err(|reason| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason,
        })?;

        if self.connection.connect_timeout_ms == 0 || self.connection.handshake_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "Timeouts must be greater than zero".to_string(),
            });
        }

        if self.reconnect.delays_ms.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "reconnect.delays_ms cannot be empty".to_string(),
            });
        }

        if self.reconnect.max_auth_attempts == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "reconnect.max_auth_attempts must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connection.connect_timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.connection.handshake_timeout_ms)
    }

    pub fn reconnect_delays(&self) -> Vec<Duration> {
        self.reconnect
            .delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

/// Accept only parseable `ws://` or `wss://` URLs.
pub(crate) fn validate_ws_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("Invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(format!(
            "Invalid URL scheme '{other}' in '{raw}' (expected ws or wss)"
        )),
    }
}

/// Load `.env` from the working directory, falling back to the executable's directory.
///
/// A missing file is not an error.
pub fn try_load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return Some(path);
    }

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let env_path = exe_dir.join(".env");
        if env_path.exists() {
            match dotenvy::from_path(&env_path) {
                Ok(()) => {
                    info!("Loaded .env from: {:?}", env_path);
                    return Some(env_path);
                }
                Err(e) => warn!("Failed to load .env from {:?}: {}", env_path, e),
            }
        }
    }

    debug!("No .env file found");
    None
}
