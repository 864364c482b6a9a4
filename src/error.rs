//! Error types for the price-compare library.

/// Message shown when a search form is submitted without any product line.
pub const NO_QUERIES_MESSAGE: &str = "Please enter at least one product.";

/// All errors that can occur when querying prices or the search backend.
#[derive(Debug, thiserror::Error)]
pub enum PriceCompareError {
    /// HTTP transport failed (connection, TLS, timeout, body read).
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A search was submitted without a single non-empty query line.
    #[error("{}", NO_QUERIES_MESSAGE)]
    NoQueries,

    /// A required configuration value is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configured base URL could not be parsed.
    #[error("invalid URL in {name}: {source}")]
    InvalidUrl {
        /// Name of the setting holding the URL.
        name: &'static str,
        /// Underlying parse failure.
        source: url::ParseError,
    },

    /// A textual identifier did not name a known value.
    #[error("unknown {kind}: {value:?}")]
    UnknownValue {
        /// What was being parsed (e.g. `"supermarket"`).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A non-HTTP data source reported a failure.
    #[error("data source error: {0}")]
    Source(String),
}

impl PriceCompareError {
    /// Consumes the error and returns the text to show a user.
    ///
    /// API errors yield the server's own message without the status
    /// prefix; every other variant yields its display text.
    #[inline]
    #[must_use]
    pub fn into_message(self) -> String {
        if let Self::Api { message, .. } = self {
            message
        } else {
            self.to_string()
        }
    }
}

/// Convenience alias for results in this crate.
pub type Result<T> = core::result::Result<T, PriceCompareError>;
