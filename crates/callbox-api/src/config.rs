//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use callbox_core::{Error, Result};

/// File name of the durable callback log inside `log_dir`.
pub const LOG_FILE_NAME: &str = "callbacks.jsonl";

/// Configuration for the Callbox receiver.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,

    /// Optional shared secret required on ingestion requests.
    ///
    /// When set to a non-empty value, POST callers must provide a matching
    /// `X-API-Key` header. Empty values are treated as unset, so the
    /// receiver never ends up behind an unmatchable key.
    #[serde(default)]
    pub app_key: Option<String>,

    /// Directory the durable callback log is written to.
    ///
    /// Created on startup if missing.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Emit logs as JSON lines instead of human-readable output.
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("app_key", &self.app_key.as_ref().map(|_| "[REDACTED]"))
            .field("log_dir", &self.log_dir)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8008,
            app_key: None,
            log_dir: default_log_dir(),
            log_json: false,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `CALLBACK_PORT` (default: 8008)
    /// - `APP_KEY` (unset or empty disables ingestion auth)
    /// - `LOG_DIR` (default: `logs`)
    /// - `CALLBOX_LOG_JSON` (default: false)
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable is present but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("CALLBACK_PORT")? {
            config.port = port;
        }
        config.app_key = env_string("APP_KEY");
        if let Some(log_dir) = env_string("LOG_DIR") {
            config.log_dir = log_dir;
        }
        if let Some(log_json) = env_bool("CALLBOX_LOG_JSON")? {
            config.log_json = log_json;
        }

        Ok(config)
    }

    /// Returns the path of the durable callback log file.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        Path::new(&self.log_dir).join(LOG_FILE_NAME)
    }

    /// Whether ingestion requests must carry a matching `X-API-Key` header.
    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        self.app_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}
