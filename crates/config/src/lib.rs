//! Configuration loading, validation, and management for Chinwag.
//!
//! Loads configuration from `~/.chinwag/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chinwag/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model provider API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Optional application password; when set, the chat command gates on it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per reply (provider default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// History persistence configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Context assembly configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Attachment ingestion policy
    #[serde(default)]
    pub attachments: AttachmentConfig,
}

fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("app_password", &redact(&self.app_password))
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("api_url", &self.api_url)
            .field("history", &self.history)
            .field("context", &self.context)
            .field("attachments", &self.attachments)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Path of the persisted log. Defaults to `~/.chinwag/chat_history.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Snapshot the prior log to a timestamped backup when clearing
    #[serde(default = "default_true")]
    pub backup_on_clear: bool,
}

fn default_true() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            backup_on_clear: true,
        }
    }
}

impl HistoryConfig {
    /// The effective history file path.
    pub fn effective_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("chat_history.json"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// System preamble placed first in every assembled request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_preamble: Option<String>,

    /// History window: `"full"` or a positive message count
    #[serde(default)]
    pub window: WindowSetting,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            system_preamble: None,
            window: WindowSetting::default(),
        }
    }
}

/// The history windowing setting as written in TOML: the string `"full"`
/// or an integer cap on the number of history messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowSetting {
    Cap(u32),
    Named(String),
}

impl Default for WindowSetting {
    fn default() -> Self {
        Self::Named("full".into())
    }
}

impl WindowSetting {
    /// The cap, or `None` for the full log.
    pub fn cap(&self) -> Option<usize> {
        match self {
            Self::Cap(n) => Some(*n as usize),
            Self::Named(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Per-file size ceiling in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Maximum image dimension after downscaling
    #[serde(default = "default_max_image_dim")]
    pub max_image_dim: u32,
}

fn default_max_bytes() -> u64 {
    5 * 1024 * 1024
}
fn default_max_image_dim() -> u32 {
    1024
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            max_image_dim: default_max_image_dim(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chinwag/config.toml).
    ///
    /// Also checks environment variables:
    /// - `CHINWAG_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `CHINWAG_APP_PASSWORD`
    /// - `CHINWAG_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("CHINWAG_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if config.app_password.is_none() {
            config.app_password = std::env::var("CHINWAG_APP_PASSWORD").ok();
        }

        if let Ok(model) = std::env::var("CHINWAG_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chinwag")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        match &self.context.window {
            WindowSetting::Cap(0) => {
                return Err(ConfigError::ValidationError(
                    "context.window must be \"full\" or a positive count".into(),
                ));
            }
            WindowSetting::Named(name) if name != "full" => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown context.window value \"{name}\" (expected \"full\" or a count)"
                )));
            }
            _ => {}
        }

        if self.attachments.max_image_dim == 0 {
            return Err(ConfigError::ValidationError(
                "attachments.max_image_dim must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            app_password: None,
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            api_url: default_api_url(),
            history: HistoryConfig::default(),
            context: ContextConfig::default(),
            attachments: AttachmentConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for chinwag_core::Error {
    fn from(e: ConfigError) -> Self {
        chinwag_core::Error::Config {
            message: e.to_string(),
        }
    }
}
