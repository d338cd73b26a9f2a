//! Notion API client.
//!
//! Provides a client for the Notion REST API with rate limiting,
//! pagination and recursive block fetching.
//!
//! ### API
//!
//! - **Endpoint**: `https://api.notion.com/v1`
//! - **Authentication**: `Authorization: Bearer <token>` plus `Notion-Version`.
//! - **Rate Limiting**: Notion averages three requests per second per
//!   integration, so requests are spaced at least 350ms apart.
//! - **Pagination**: list endpoints are followed via `has_more`/`next_cursor`.

pub mod assets;
pub mod error;
pub mod types;

pub use assets::{ImageAsset, ImageAssetOptions, get_image_assets};
pub use error::NotionError;
pub use types::{Block, Database, FileObject, Page, PaginatedList, PropertyValue, RichText, SelectOption};

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use dranks_core::AppConfig;
use regex::Regex;
use reqwest::{Method, header};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// Default base URL for the Notion API.
const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Default Notion-Version header.
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "dranks/0.1";

/// Minimum interval between requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(350);

/// Largest page size Notion accepts.
const PAGE_SIZE: u32 = 100;

static NOTION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}$")
        .expect("notion id pattern is valid")
});

/// Check that `id` looks like a Notion UUID (dashed or not).
pub fn validate_id(id: &str) -> Result<(), NotionError> {
    if NOTION_ID.is_match(id.trim()) { Ok(()) } else { Err(NotionError::InvalidId(id.to_string())) }
}

/// Notion client configuration.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token.
    pub token: String,
    /// Base URL (default: https://api.notion.com/v1).
    pub base_url: String,
    /// Notion-Version header (default: 2022-06-28).
    pub notion_version: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string (default: dranks/0.x).
    pub user_agent: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NotionConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotionError> {
        let token = config.require_notion_token().map_err(|_| NotionError::MissingToken)?;

        Ok(Self {
            token: token.to_string(),
            base_url: config.notion_base_url.clone(),
            notion_version: config.notion_version.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_interval }
    }

    /// Acquire permission to make a request, waiting if necessary.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// The Notion operations the catalog depends on.
///
/// Implemented by [`NotionClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait NotionApi: Send + Sync + 'static {
    async fn get_database(&self, database_id: &str) -> Result<Database, NotionError>;

    /// Every page of a database, following pagination.
    async fn get_database_pages(&self, database_id: &str) -> Result<Vec<Page>, NotionError>;

    async fn get_page(&self, page_id: &str) -> Result<Page, NotionError>;

    /// Every child block of `block_id`, with nested children filled in.
    async fn get_blocks_with_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError>;
}

/// Notion API client.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: Url,
    config: NotionConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl NotionClient {
    /// Create a new Notion client with the given configuration.
    pub fn new(config: NotionConfig) -> Result<Self, NotionError> {
        if config.token.is_empty() {
            return Err(NotionError::MissingToken);
        }

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| NotionError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(NotionError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotionError::Network(Arc::new(e)))?;

        Ok(Self { http, base_url, config, rate_limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)) })
    }

    /// Create a new Notion client from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotionError> {
        Self::new(NotionConfig::from_app_config(config)?)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send one rate-limited request and decode the JSON response.
    async fn request<T: DeserializeOwned>(
        &self, method: Method, url: Url, body: Option<serde_json::Value>,
    ) -> Result<T, NotionError> {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        tracing::debug!(method = %method, path = url.path(), "notion request");

        let mut request = self
            .http
            .request(method, url.clone())
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.notion_version)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "notion response");

        if status == 401 || status == 403 {
            return Err(NotionError::AuthError { status: status.as_u16() });
        }

        if status == 404 {
            return Err(NotionError::NotFound(url.path().to_string()));
        }

        if status == 429 {
            return Err(NotionError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(NotionError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NotionError::Parse(e.to_string()))
    }

    /// Child blocks of `block_id`, one level deep.
    async fn get_block_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["blocks", block_id, "children"]);
            url.query_pairs_mut().append_pair("page_size", &PAGE_SIZE.to_string());
            if let Some(cursor) = &cursor {
                url.query_pairs_mut().append_pair("start_cursor", cursor);
            }

            let list: PaginatedList<Block> = self.request(Method::GET, url, None).await?;
            blocks.extend(list.results);

            match list.next_cursor {
                Some(next) if list.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blocks)
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn get_database(&self, database_id: &str) -> Result<Database, NotionError> {
        validate_id(database_id)?;
        self.request(Method::GET, self.endpoint(&["databases", database_id]), None).await
    }

    async fn get_database_pages(&self, database_id: &str) -> Result<Vec<Page>, NotionError> {
        validate_id(database_id)?;

        let url = self.endpoint(&["databases", database_id, "query"]);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::json!({ "page_size": PAGE_SIZE });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = serde_json::Value::from(cursor.as_str());
            }

            let list: PaginatedList<Page> = self.request(Method::POST, url.clone(), Some(body)).await?;
            pages.extend(list.results);

            match list.next_cursor {
                Some(next) if list.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(database_id, count = pages.len(), "fetched database pages");
        Ok(pages)
    }

    async fn get_page(&self, page_id: &str) -> Result<Page, NotionError> {
        validate_id(page_id)?;
        self.request(Method::GET, self.endpoint(&["pages", page_id]), None).await
    }

    async fn get_blocks_with_children(&self, block_id: &str) -> Result<Vec<Block>, NotionError> {
        validate_id(block_id)?;

        let mut blocks = self.get_block_children(block_id).await?;
        for block in &mut blocks {
            if block.has_children {
                block.children = self.get_blocks_with_children(&block.id).await?;
            }
        }
        Ok(blocks)
    }
}
