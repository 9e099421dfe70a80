//! Configuration file support.
//!
//! # Configuration File Format
//!
//! ```toml
//! # api_key = "..."   # or set GEMINI_API_KEY
//! model = "gemini-2.5-flash"
//! api_base = "https://generativelanguage.googleapis.com/v1beta"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! static_dir = "public"
//!
//! [retry]
//! max_attempts = 3
//! delay_ms = 2000
//! attempt_timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use std::path::Path;

use super::Config;

impl Config {
    /// Load configuration from a TOML file, without environment overrides
    pub fn load_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
