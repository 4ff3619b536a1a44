//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version` or `user_agent` is empty
    /// - `origin` has no http(s) scheme
    /// - `landing_path` is not an absolute path
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.is_empty() {
            return Err(ConfigError::Invalid { field: "version".into(), reason: "must not be empty".into() });
        }

        if !self.origin.starts_with("http://") && !self.origin.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: "must be an absolute http(s) URL".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !self.landing_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "landing_path".into(),
                reason: "must start with '/'".into(),
            });
        }

        if !self.allow_substrings.is_empty() && self.deny_substrings.is_empty() {
            tracing::warn!(
                allow_count = self.allow_substrings.len(),
                "allow_substrings overridden without deny_substrings; \
                 built-in exemptions no longer apply"
            );
        }

        Ok(())
    }
}
