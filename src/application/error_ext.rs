//! Error conversion helpers
//!
//! Extension traits attaching path or codec context to foreign errors.

use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::application::format::FormatKind;
use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// let text = fs.read_to_string(&path)
    ///     .with_path_context("read outline", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait tagging codec errors with the format that raised them.
pub trait FormatResultExt<T> {
    fn for_format(self, format: FormatKind) -> ApplicationResult<T>;
}

impl<T, E: Display> FormatResultExt<T> for Result<T, E> {
    fn for_format(self, format: FormatKind) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::format(format, e.to_string()))
    }
}
