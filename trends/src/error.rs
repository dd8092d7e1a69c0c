use http::StatusCode;
use thiserror::Error;

/// Result type alias for trends operations
pub type Result<T, E = TrendsError> = std::result::Result<T, E>;

/// Errors produced while validating incoming query parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing keyword")]
    MissingKeyword,

    #[error("Too many keywords: at most {limit} allowed, got {actual}")]
    TooManyKeywords { limit: usize, actual: usize },
}

/// Errors from a single upstream interest-over-time call
///
/// These never propagate past the aggregation loop; a failed geo is logged
/// and dropped from the result set.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(StatusCode),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("No interest-over-time widget in explore response")]
    MissingWidget,
}

/// Request-level errors surfaced to the HTTP boundary
#[derive(Error, Debug)]
pub enum TrendsError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("No data found")]
    NoDataFound,
}
