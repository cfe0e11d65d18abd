use std::time::Duration;

use thiserror::Error;

/// Errors from the enrichment client.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status. `retry_after` is the
    /// server's hint (`Retry-After` header or `RetryInfo.retryDelay`), if any.
    #[error("model API returned HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    /// The response body did not have the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model returned no text (e.g. the prompt was blocked).
    #[error("model returned no text")]
    EmptyResponse,

    #[error("invalid model endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
