//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::path::NodePath;

/// Domain errors represent violations of tree or path invariants.
/// A failing operation never leaves a partially mutated tree behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("index {index} out of range: only {len} siblings")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot move {from} to {to}: target is the node itself or one of its descendants")]
    IllegalMove { from: NodePath, to: NodePath },

    #[error("no node at path: {0}")]
    PathNotFound(NodePath),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("invalid value for attribute '{key}': {value}")]
    InvalidAttributeValue { key: String, value: String },
}

impl DomainError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
