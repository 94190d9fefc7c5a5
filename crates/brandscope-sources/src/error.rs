use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {service} (retry after {retry_after_secs}s)")]
    RateLimited {
        service: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("browser session error: {0}")]
    Browser(String),

    #[error("{0} is not configured")]
    Disabled(&'static str),
}

impl SourceError {
    /// Transient failures worth another attempt after a back-off delay:
    /// rate limiting, network failures and 5xx responses.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            SourceError::RateLimited { .. } | SourceError::Http(_) => true,
            SourceError::UnexpectedStatus { status, .. } => *status >= 500,
            SourceError::Deserialize { .. }
            | SourceError::NotFound { .. }
            | SourceError::InvalidUrl { .. }
            | SourceError::Browser(_)
            | SourceError::Disabled(_) => false,
        }
    }
}
