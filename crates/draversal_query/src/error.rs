//! Query error types.

use thiserror::Error;

/// Errors that can occur while flattening, reconstructing or querying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Invalid separator or index token configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown operator, malformed pattern or malformed flattened key.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A well-formed flattened key does not resolve in the node. Holds the
    /// key.
    #[error("Key '{0}' does not resolve")]
    Address(String),
}

impl QueryError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Creates an address error for `key`.
    pub fn address(key: impl Into<String>) -> Self {
        Self::Address(key.into())
    }
}
