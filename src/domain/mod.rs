//! Domain layer: outline tree, paths, navigation and structural edits
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every operation is a pure function over immutable [`Tree`] snapshots.

pub mod error;
pub mod mutator;
pub mod navigator;
pub mod node;
pub mod path;
pub mod placement;

pub use error::{DomainError, DomainResult};
pub use mutator::{delete_node, insert_node, move_node, set_attribute};
pub use navigator::{next, previous};
pub use node::{Attribute, Node, NodeRef, Tree, TreeIterator};
pub use path::NodePath;
pub use placement::{classify, validate_target, MovePosition, Point, TargetBox};
