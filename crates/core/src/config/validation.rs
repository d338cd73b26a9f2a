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

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache.capacity` or `cache.ttl_ms` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `notion_base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid { field: "cache.capacity".into(), reason: "must be greater than 0".into() });
        }
        if self.cache.ttl_ms == 0 {
            return Err(ConfigError::Invalid { field: "cache.ttl_ms".into(), reason: "must be greater than 0".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !self.notion_base_url.starts_with("http://") && !self.notion_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "notion_base_url".into(),
                reason: "must be an http or https URL".into(),
            });
        }

        if self.image_assets_database_id.is_none() {
            tracing::debug!("image_assets_database_id is not set; image asset lookups are disabled");
        }

        Ok(())
    }
}
