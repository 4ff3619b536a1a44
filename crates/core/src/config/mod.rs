//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PORTICO_*)
//! 2. TOML config file (if PORTICO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PORTICO_*)
/// 2. TOML config file (if PORTICO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment version identifier, supplied by the external deployment
    /// process. The cache version name is derived from it.
    ///
    /// Set via PORTICO_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin against which relative asset and landing paths resolve.
    ///
    /// Set via PORTICO_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via PORTICO_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PORTICO_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Asset manifest: ordered list of paths pre-populated at install.
    /// Consumed as an opaque array.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Path opened when a notification is clicked and no application
    /// instance is connected.
    ///
    /// Set via PORTICO_LANDING_PATH environment variable.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Caching allow-list overrides: URL substrings whose responses are
    /// eligible for caching. Empty means the built-in policy defaults.
    #[serde(default)]
    pub allow_substrings: Vec<String>,

    /// Caching exemption overrides: URL substrings that must stay live even
    /// when an allow pattern matches. Empty means the built-in policy
    /// defaults.
    #[serde(default)]
    pub deny_substrings: Vec<String>,
}

fn default_version() -> String {
    "dev".into()
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./portico-cache.sqlite")
}

fn default_user_agent() -> String {
    "portico/0.1".into()
}

fn default_assets() -> Vec<String> {
    vec!["/".into()]
}

fn default_landing_path() -> String {
    "/profile".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            assets: default_assets(),
            landing_path: default_landing_path(),
            allow_substrings: Vec::new(),
            deny_substrings: Vec::new(),
        }
    }
}

impl AppConfig {
    /// The cache version name for this deployment.
    pub fn cache_name(&self) -> String {
        format!("cache-{}", self.version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PORTICO_`
    /// 2. TOML file from `PORTICO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PORTICO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PORTICO_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
