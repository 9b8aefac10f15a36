//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod format;
pub mod services;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{FormatResultExt, IoResultExt};
pub use format::{ExportOptions, FormatKind, OutlineFormat};
pub use session::{DragState, DropPreview, EditState, OutlineSession};
