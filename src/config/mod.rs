//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `MYSTERY_SCOUT_*` environment variables (`__` separates nested
//! keys, e.g. `MYSTERY_SCOUT_SERVER__PORT=8080`). The Gemini credential is
//! read from `GEMINI_API_KEY`, falling back to `api_key` in the file.

mod file_config;

pub use file_config::ConfigFileError;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::completion::{DEFAULT_MODEL, GEMINI_API_BASE};
use crate::utils::RetryConfig;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "MYSTERY_SCOUT";

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "mystery-scout.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Gemini model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            server: ServerConfig::default(),
            retry: RetrySettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    GEMINI_API_BASE.to_string()
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Completion retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-attempt timeout; `0` disables it
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_attempt_timeout_secs() -> u64 {
    60
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Retry policy for the completion client
    pub fn retry_config(&self) -> RetryConfig {
        let timeout = match self.retry.attempt_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        RetryConfig::default()
            .max_attempts(self.retry.max_attempts)
            .delay(Duration::from_millis(self.retry.delay_ms))
            .attempt_timeout(timeout)
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Non-empty API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Copy safe to print: the API key is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.api_key = self.api_key().map(|key| {
            let visible: String = key.chars().take(4).collect();
            format!("{}****", visible)
        });
        config
    }
}

/// Locate a configuration file when none was given explicitly
///
/// Checks `./mystery-scout.toml`, then `<config dir>/mystery-scout/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

/// Per-user configuration path, whether or not it exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mystery-scout").join("config.toml"))
}

/// Load configuration from defaults, an optional file and the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    if let Some(key) = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
    {
        config.api_key = Some(key);
    }
    Ok(config)
}

/// Get the default configuration
pub fn get_config() -> Config {
    Config::default()
}
