use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid product URL \"{url}\": {reason}")]
    InvalidProductUrl { url: String, reason: String },

    #[error("{context}: missing {field}")]
    MissingField { context: String, field: String },

    #[error("page error: {0}")]
    Page(#[from] PageError),
}

impl ScraperError {
    /// Short fault category carried into `Status::CollectorFault`.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            ScraperError::Http(_)
            | ScraperError::RateLimited { .. }
            | ScraperError::NotFound { .. }
            | ScraperError::UnexpectedStatus { .. } => "http",
            ScraperError::Deserialize { .. } => "json",
            ScraperError::InvalidProductUrl { .. } => "input",
            ScraperError::MissingField { .. } => "platform",
            ScraperError::Page(_) => "page",
        }
    }
}

/// Failures reported by a [`crate::page::PageSession`].
#[derive(Debug, Error)]
pub enum PageError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("no page loaded")]
    NoDocument,

    #[error("invalid selector \"{selector}\"")]
    Selector { selector: String },

    #[error("{0} is not supported by this page session")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
