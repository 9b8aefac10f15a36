//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::format::FormatKind;
use crate::domain::{DomainError, NodePath};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{format} format error: {message}")]
    Format { format: FormatKind, message: String },

    #[error("edit in progress at {0}: commit or cancel it first")]
    EditInProgress(NodePath),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub(crate) fn format(format: FormatKind, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
