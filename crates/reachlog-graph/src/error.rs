use thiserror::Error;

/// Errors returned by the Graph API insights client.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API answered with an `{"error": {...}}` envelope.
    #[error("Graph API error (HTTP {status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
        /// Graph's own `is_transient` hint.
        transient: bool,
    },

    /// A non-2xx status without a parseable error envelope.
    #[error("unexpected HTTP status {status} for {context}")]
    UnexpectedStatus { status: u16, context: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response that does not carry the requested metric.
    #[error("response for {context} has no value for metric '{metric}'")]
    MissingMetric { metric: String, context: String },

    #[error(transparent)]
    Config(#[from] reachlog_core::ConfigError),

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
