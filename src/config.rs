//! Optional TOML settings for fetching and output, read from
//! `~/.config/unifeed/config.toml` unless `--config` names another file.
//!
//! ```toml
//! timeout_secs = 30
//! max_feed_bytes = 10485760
//! max_retries = 3
//! user_agent = "unifeed/0.1.0"
//! format_timestamps = false
//! ```
//!
//! Every key may be left out. A missing or blank file means defaults.
//! Unrecognized keys are logged and otherwise ignored.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// SEC-014: Config files above this size are refused unread.
pub const MAX_CONFIG_BYTES: u64 = 1_048_576;

const KEYS: &[&str] = &[
    "timeout_secs",
    "max_feed_bytes",
    "max_retries",
    "user_agent",
    "format_timestamps",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014
    #[error("Config file too large: {size} bytes (limit {max})", max = MAX_CONFIG_BYTES)]
    TooLarge { size: u64 },
}

/// Fetch and output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Limit for one fetch attempt, headers and body included.
    pub timeout_secs: u64,
    /// Largest feed body accepted.
    pub max_feed_bytes: usize,
    /// Retries after HTTP 429, 5xx or a truncated body.
    pub max_retries: u32,
    pub user_agent: String,
    /// Rewrite item timestamps into local display form before printing.
    pub format_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_feed_bytes: 10 * 1024 * 1024,
            max_retries: 3,
            user_agent: concat!("unifeed/", env!("CARGO_PKG_VERSION")).to_string(),
            format_timestamps: false,
        }
    }
}

impl Config {
    /// Reads settings from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match read_bounded(path) {
            Ok(content) => content,
            Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        Self::from_toml(&content)
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let table: toml::Table = content.parse()?;
        for key in table.keys().filter(|key| !KEYS.contains(&key.as_str())) {
            tracing::warn!(key = %key, "Ignoring unknown config key");
        }

        let config = Self::deserialize(toml::Value::Table(table))?;
        tracing::debug!(?config, "Loaded config");
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn read_bounded(path: &Path) -> Result<String, ConfigError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_CONFIG_BYTES {
        return Err(ConfigError::TooLarge { size });
    }
    Ok(std::fs::read_to_string(path)?)
}
