//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. `ALLOWED_ORIGINS` (unprefixed, comma-separated)
//! 2. Environment variables (PAGETITLE_*)
//! 3. TOML config file (if PAGETITLE_CONFIG_FILE set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via PAGETITLE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Socket address the HTTP server binds to.
    ///
    /// Set via PAGETITLE_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// User-Agent string for page fetches.
    ///
    /// Set via PAGETITLE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a single page fetch in milliseconds.
    ///
    /// Set via PAGETITLE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to download per page.
    ///
    /// Set via PAGETITLE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of URLs of one batch fetched at the same time.
    ///
    /// Set via PAGETITLE_BATCH_CONCURRENCY environment variable.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Origins allowed to call the API from a browser.
    ///
    /// Set via ALLOWED_ORIGINS or PAGETITLE_ALLOWED_ORIGINS (comma-separated).
    /// Entries are trimmed and lose any trailing `/`.
    #[serde(default, deserialize_with = "deserialize_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./cache.sqlite")
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".into()
}

fn default_user_agent() -> String {
    "pagetitle/0.1".into()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_batch_concurrency() -> usize {
    4
}

/// Accept either a list or a single comma-separated string.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Csv(String),
    }

    let raw = match Origins::deserialize(deserializer)? {
        Origins::List(list) => list,
        Origins::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(raw
        .iter()
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            batch_concurrency: default_batch_concurrency(),
            allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. `ALLOWED_ORIGINS`
    /// 2. Environment variables prefixed with `PAGETITLE_`
    /// 3. TOML file from `PAGETITLE_CONFIG_FILE` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGETITLE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment
            .merge(
                Env::prefixed("PAGETITLE_")
                    .ignore(&["config_file"])
                    .map(|key| key.as_str().to_lowercase().into()),
            )
            .merge(Env::raw().only(&["allowed_origins"]));

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
