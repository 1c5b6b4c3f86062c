//! Configuration management.
//!
//! Settings come from an optional TOML file, overridden by environment
//! variables prefixed with `FEEDSTREAM_` (nested keys separated by `__`):
//!
//! ```toml
//! [api]
//! base_url = "https://api.mysocialapp.io/api/v1"
//! access_token = "..."
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//!
//! [paging]
//! on_page_error = "propagate"   # or "exhaust"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! e.g. `FEEDSTREAM_PAGING__ON_PAGE_ERROR=exhaust`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::stream::PageErrorPolicy;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "feedstream.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Stream behaviour
    #[serde(default)]
    pub paging: PagingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token (optional, falls back to `FEEDSTREAM_ACCESS_TOKEN`)
    #[serde(default = "default_access_token")]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: default_access_token(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.mysocialapp.io/api/v1".to_string()
}

fn default_access_token() -> Option<String> {
    std::env::var("FEEDSTREAM_ACCESS_TOKEN").ok()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Stream behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagingConfig {
    /// What a multi-page stream does when a page fetch fails
    #[serde(default)]
    pub on_page_error: PageErrorPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, plain text otherwise
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("FEEDSTREAM")
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment())
        .build()?
        .try_deserialize()
}

/// Look for a config file in the working directory, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("feedstream").join("config.toml"))
        .filter(|path| path.is_file())
}
