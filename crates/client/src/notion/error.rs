//! Notion API client error types.

use std::sync::Arc;

use dranks_core::Error;

/// Errors from the Notion API client.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    /// No integration token configured.
    #[error("missing token: DRANKS_NOTION_TOKEN not set")]
    MissingToken,

    /// The base URL could not be parsed.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// Not a Notion page, database or block id.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Authentication failed (invalid token or the integration lacks access).
    #[error("authentication failed: status {status}")]
    AuthError { status: u16 },

    /// The object does not exist or is not shared with the integration.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the Notion API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NotionError::Timeout } else { NotionError::Network(Arc::new(err)) }
    }
}

impl From<NotionError> for Error {
    fn from(err: NotionError) -> Self {
        let message = err.to_string();
        match err {
            NotionError::MissingToken | NotionError::InvalidBaseUrl(_) | NotionError::InvalidId(_) => {
                Error::InvalidInput(message)
            }
            NotionError::AuthError { .. } => Error::UpstreamAuth(message),
            NotionError::NotFound(_) => Error::NotFound(message),
            NotionError::RateLimited => Error::UpstreamRateLimited(message),
            NotionError::Timeout => Error::UpstreamTimeout(message),
            NotionError::HttpError { .. } | NotionError::Network(_) => Error::Upstream(message),
            NotionError::Parse(_) => Error::ParseFailed(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotionError::MissingToken;
        assert!(err.to_string().contains("DRANKS_NOTION_TOKEN"));

        let err = NotionError::HttpError { status: 502 };
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_into_core_error() {
        assert!(matches!(Error::from(NotionError::AuthError { status: 401 }), Error::UpstreamAuth(_)));
        assert!(matches!(Error::from(NotionError::RateLimited), Error::UpstreamRateLimited(_)));
        assert!(matches!(Error::from(NotionError::NotFound("page".into())), Error::NotFound(_)));
        assert!(matches!(Error::from(NotionError::Timeout), Error::UpstreamTimeout(_)));
        assert!(matches!(Error::from(NotionError::Parse("eof".into())), Error::ParseFailed(_)));
        assert!(matches!(Error::from(NotionError::InvalidId("x".into())), Error::InvalidInput(_)));
    }
}
