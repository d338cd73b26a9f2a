//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (DRANKS_*)
//! 2. TOML config file (if DRANKS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheOptions;

mod validation;

pub use validation::ConfigError;

/// Runtime mode. Cache warming only runs in production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DRANKS_*, nested with `__`, e.g. DRANKS_CACHE__TTL_MS)
/// 2. TOML config file (if DRANKS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Notion integration token.
    ///
    /// Set via DRANKS_NOTION_TOKEN environment variable.
    /// Required at startup.
    #[serde(default)]
    pub notion_token: Option<String>,

    /// Notion database holding the drinks.
    ///
    /// Set via DRANKS_NOTION_DRINKS_DATABASE_ID environment variable.
    #[serde(default)]
    pub notion_drinks_database_id: Option<String>,

    /// Notion database holding decorative image assets.
    ///
    /// Set via DRANKS_IMAGE_ASSETS_DATABASE_ID environment variable.
    /// The image_assets tool is disabled when unset.
    #[serde(default)]
    pub image_assets_database_id: Option<String>,

    /// Notion API base URL.
    #[serde(default = "default_notion_base_url")]
    pub notion_base_url: String,

    /// Value of the Notion-Version header.
    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via DRANKS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via DRANKS_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Runtime mode: development or production.
    ///
    /// Set via DRANKS_ENVIRONMENT environment variable.
    #[serde(default)]
    pub environment: Environment,

    /// Options shared by every upstream cache.
    #[serde(default)]
    pub cache: CacheOptions,
}

fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".into()
}

fn default_notion_version() -> String {
    "2022-06-28".into()
}

fn default_user_agent() -> String {
    "dranks/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notion_token: None,
            notion_drinks_database_id: None,
            image_assets_database_id: None,
            notion_base_url: default_notion_base_url(),
            notion_version: default_notion_version(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            environment: Environment::default(),
            cache: CacheOptions::default(),
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
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The layered figment behind [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("DRANKS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("DRANKS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Notion token (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set.
    pub fn require_notion_token(&self) -> Result<&str, ConfigError> {
        self.notion_token.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "notion_token".into(),
            hint: "Set DRANKS_NOTION_TOKEN environment variable".into(),
        })
    }

    /// Drinks database id (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the database id is not set.
    pub fn require_drinks_database_id(&self) -> Result<&str, ConfigError> {
        self.notion_drinks_database_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "notion_drinks_database_id".into(),
            hint: "Set DRANKS_NOTION_DRINKS_DATABASE_ID environment variable".into(),
        })
    }
}
