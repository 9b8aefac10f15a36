//! Outline trees with typed node paths.
//!
//! The [`domain`] layer holds the persistent tree, path codec, pre-order
//! navigation, copy-on-write mutations and drop placement. The
//! [`application`] layer adds document codecs, the editing session and the
//! document service; [`cli`] exposes everything as the `outliner` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, OutlineSession};
pub use domain::{DomainError, DomainResult, MovePosition, Node, NodePath, Tree};
