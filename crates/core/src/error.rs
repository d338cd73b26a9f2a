//! Unified error types for dranks.
//!
//! Every variant renders with a stable code prefix so log lines and tool
//! responses can be matched without parsing the message.

use std::sync::Arc;

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::cache::key::fingerprint;

/// Unified error types for the dranks service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty slug).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The requested item does not exist upstream or in the catalog.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Upstream API returned an error response or the request failed.
    #[error("UPSTREAM_ERROR: {0}")]
    Upstream(String),

    /// Upstream API rejected our credentials.
    #[error("UPSTREAM_AUTH: {0}")]
    UpstreamAuth(String),

    /// Upstream API rate limited us.
    #[error("UPSTREAM_RATE_LIMITED: {0}")]
    UpstreamRateLimited(String),

    /// Upstream request timed out.
    #[error("UPSTREAM_TIMEOUT: {0}")]
    UpstreamTimeout(String),

    /// Upstream content did not have the expected shape.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// A cache miss could not be filled because the fetch failed.
    ///
    /// The source is shared by every caller that waited on the same fetch.
    #[error("FETCH_FAILED: {cache} {}: {source}", fingerprint(key))]
    FetchFailed { cache: String, key: String, source: Arc<Error> },

    /// The in-flight fetch was aborted and there was nothing stale to serve.
    #[error("FETCH_ABORTED: {cache} {}", fingerprint(key))]
    FetchAborted { cache: String, key: String },
}

impl Error {
    /// JSON-RPC error code for this error.
    ///
    /// Fetch failures report the code of the upstream failure they wrap.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) => -32602,
            Error::ParseFailed(_) => -32000,
            Error::NotFound(_) => -32001,
            Error::UpstreamTimeout(_) => -32006,
            Error::Upstream(_) => -32008,
            Error::UpstreamAuth(_) => -32009,
            Error::UpstreamRateLimited(_) => -32010,
            Error::FetchAborted { .. } => -32011,
            Error::FetchFailed { source, .. } => source.code(),
        }
    }

    /// The innermost error, looking through cache fetch wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::FetchFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        McpError { code: ErrorCode(err.code()), message: err.to_string().into(), data: None }
    }
}
