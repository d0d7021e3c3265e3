//! Error types for the extraction pipeline.
//!
//! Only configuration errors are ever surfaced to the caller of a run; fetch and
//! field errors are logged and recovered where they happen.

use thiserror::Error;

/// Failure to turn a URL into a parsed document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("page not found")]
    NotFound,

    #[error("server responded with status {0}")]
    ServerError(u16),

    #[error("network error: {0}")]
    Network(String),
}

/// Failure reported by a [`crate::fetcher::Transport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered, but with a retryable status.
    #[error("retryable status {0}")]
    Status(u16),

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(String),
}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Status(404) => FetchError::NotFound,
            TransportError::Status(code) => FetchError::ServerError(code),
            TransportError::Request(msg) => FetchError::Network(msg),
        }
    }
}

/// A single article field could not be extracted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldExtractionError {
    #[error("no element matched the {field} query")]
    NoMatch { field: &'static str },
}

/// Problems with the site configuration file or one of its entries.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("site {site}: missing query `{query}`")]
    MissingQuery { site: String, query: &'static str },

    #[error("site {site}: invalid query `{query}`: {reason}")]
    InvalidQuery {
        site: String,
        query: String,
        reason: String,
    },

    #[error("site {site}: missing `url`")]
    MissingHost { site: String },

    #[error("site {site}: invalid host `{host}`")]
    InvalidHost { site: String, host: String },

    #[error("duplicate site id `{0}`")]
    DuplicateId(String),

    #[error("no usable site in configuration")]
    NoSites,

    #[error("no configured site matches {0:?}")]
    NoSiteSelected(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_classification() {
        assert_eq!(FetchError::from(TransportError::Status(404)), FetchError::NotFound);
        assert_eq!(
            FetchError::from(TransportError::Status(503)),
            FetchError::ServerError(503)
        );
        assert_eq!(
            FetchError::from(TransportError::Request("timed out".into())),
            FetchError::Network("timed out".into())
        );
    }

    #[test]
    fn test_field_error_message() {
        let e = FieldExtractionError::NoMatch { field: "body" };
        assert_eq!(e.to_string(), "no element matched the body query");
    }
}
