//! Error types for tree construction and editing.

use crate::data::node::NodeId;

/// Errors raised by tree edits, schema parsing and filtering.
///
/// Every failing edit leaves the tree untouched.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The committed value does not fit the node's variant.
    #[error("type mismatch at `{path}`: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// The node's value is locked by the schema or the tree options.
    #[error("`{path}` is not editable")]
    NotEditable { path: String },

    /// A structural edit was aimed at a node that cannot take it.
    #[error("invalid target `{path}`: {reason}")]
    InvalidTarget { path: String, reason: String },

    /// The key already exists in the target map.
    #[error("key `{key}` already exists in `{path}`")]
    DuplicateKey { path: String, key: String },

    /// No child with this key under the given container.
    #[error("key not found: `{path}`")]
    KeyNotFound { path: String },

    /// The node id does not belong to this tree.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The filter pattern is not a valid regular expression.
    #[error("invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The schema document could not be parsed.
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] serde_json::Error),
}

/// Result alias for tree operations.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;
