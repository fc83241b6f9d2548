//! Connector error types.

/// A batch could not be fetched.
///
/// Raised per batch; the orchestrator turns it into a failed source flag.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Invalid API key or unauthorized
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by upstream API")]
    RateLimited,

    /// The request URL could not be built from configuration
    #[error("invalid request URL {url:?}: {message}")]
    Url { url: String, message: String },

    /// A mock connector had nothing scripted for the query
    #[error("no mock response for {0}")]
    Unscripted(String),

    /// Reading fixture payloads failed
    #[error("failed to load mock payload {path}: {message}")]
    Fixture { path: String, message: String },
}
