//! Address error types.

use thiserror::Error;

/// Errors raised when an index or path cannot be resolved against a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A nested path does not lead to a node.
    #[error("Path {path:?} does not resolve to a node")]
    Unreachable {
        /// The path that failed to resolve.
        path: Vec<usize>,
    },

    /// A child position is past the end of the child list.
    #[error("Position {index} is out of range for {len} children")]
    OutOfRange { index: usize, len: usize },

    /// A child range is reversed or extends past the child list.
    #[error("Range {start}..{end} is invalid for {len} children")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// A field index names an attribute the node does not have.
    #[error("Field '{0}' does not exist")]
    MissingField(String),

    /// A nested path index was empty where a child must be addressed.
    #[error("Nested path must not be empty")]
    EmptyPath,

    /// The index kind cannot be used for the requested operation.
    #[error("{operation} is not supported for {kind} indices")]
    Unsupported {
        operation: &'static str,
        kind: &'static str,
    },

    /// A value written to the children field is not a sequence of nodes,
    /// or a value written as a child is not a node.
    #[error("Field '{0}' must hold a sequence of nodes")]
    InvalidChildren(String),

    /// A well-formed flattened key names nothing in the node.
    #[error("Key '{0}' does not resolve")]
    UnresolvedKey(String),
}

impl AddressError {
    /// Creates an unreachable-path error.
    pub fn unreachable(path: &[usize]) -> Self {
        Self::Unreachable {
            path: path.to_vec(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(operation: &'static str, kind: &'static str) -> Self {
        Self::Unsupported { operation, kind }
    }
}
