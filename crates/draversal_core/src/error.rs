//! Traversal error types.

use draversal_query::QueryError;
use draversal_tree::AddressError;
use thiserror::Error;

/// Errors that can occur while navigating or editing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    /// Bad constructor arguments or configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An index or path did not resolve.
    #[error("Address error: {0}")]
    Address(AddressError),

    /// Protocol stepping ran past either end of the tree.
    #[error("Stop: {0}")]
    Stop(String),

    /// An argument is outside what the operation accepts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown operator or malformed pattern.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Structural check failure.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TraversalError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a stop signal.
    pub fn stop(message: impl Into<String>) -> Self {
        Self::Stop(message.into())
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns true for the end-of-traversal signal.
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

impl From<AddressError> for TraversalError {
    fn from(error: AddressError) -> Self {
        match error {
            // A malformed child list is a bad argument, not a bad address.
            AddressError::InvalidChildren(_) => Self::InvalidArgument(error.to_string()),
            other => Self::Address(other),
        }
    }
}

impl From<QueryError> for TraversalError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Configuration(message) => Self::Configuration(message),
            QueryError::InvalidQuery(message) => Self::InvalidQuery(message),
            QueryError::Address(key) => Self::Address(AddressError::UnresolvedKey(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_error_mapping() {
        let err = TraversalError::from(AddressError::EmptyPath);
        assert_eq!(err, TraversalError::Address(AddressError::EmptyPath));

        let err = TraversalError::from(AddressError::InvalidChildren("sections".into()));
        assert!(matches!(err, TraversalError::InvalidArgument(_)));
    }

    #[test]
    fn test_query_error_mapping() {
        let err = TraversalError::from(QueryError::invalid_query("unknown operator 'x'"));
        assert_eq!(
            err,
            TraversalError::InvalidQuery("unknown operator 'x'".to_string())
        );
        assert!(!err.is_stop());
        assert!(TraversalError::stop("end").is_stop());

        let err = TraversalError::from(QueryError::address("sections#9.title"));
        assert_eq!(
            err,
            TraversalError::Address(AddressError::UnresolvedKey("sections#9.title".to_string()))
        );
    }
}
