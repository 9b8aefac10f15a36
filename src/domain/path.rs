//! Typed node paths and their textual form.
//!
//! A path is an ordered, non-empty sequence of sibling indices. The textual
//! form joins indices with a `children` marker, e.g. `0.children.2`; it is
//! parsed and formatted only at the boundary, everything else works on
//! [`NodePath`] directly.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::domain::error::{DomainError, DomainResult};

/// Marker segment separating indices in the textual form.
pub const CHILDREN_MARKER: &str = "children";

const SEPARATOR: char = '.';

/// Location of a node in the forest: root index first, then child indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root node at `index`.
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Build a path from raw indices. Fails on an empty sequence.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> DomainResult<Self> {
        let indices: Vec<usize> = indices.into_iter().collect();
        if indices.is_empty() {
            return Err(DomainError::invalid_path("", "a path needs at least one index"));
        }
        Ok(Self(indices))
    }

    /// Parse the textual form, e.g. `0.children.1`.
    pub fn parse(text: &str) -> DomainResult<Self> {
        if text.is_empty() {
            return Err(DomainError::invalid_path(text, "empty path"));
        }

        let mut indices = Vec::new();
        for (position, segment) in text.split(SEPARATOR).enumerate() {
            if position % 2 == 1 {
                if segment != CHILDREN_MARKER {
                    return Err(DomainError::invalid_path(
                        text,
                        format!("expected '{CHILDREN_MARKER}' marker, found '{segment}'"),
                    ));
                }
                continue;
            }
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DomainError::invalid_path(
                    text,
                    format!("segment '{segment}' is not an index"),
                ));
            }
            if segment.len() > 1 && segment.starts_with('0') {
                return Err(DomainError::invalid_path(
                    text,
                    format!("segment '{segment}' has a leading zero"),
                ));
            }
            let index = segment.parse::<usize>().map_err(|e| {
                DomainError::invalid_path(text, format!("segment '{segment}': {e}"))
            })?;
            indices.push(index);
        }

        // An even segment count means the text ends on a marker.
        if text.split(SEPARATOR).count() % 2 == 0 {
            return Err(DomainError::invalid_path(text, "path ends with a marker"));
        }
        Ok(Self(indices))
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of indices; a root path has depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Index of the addressed node among its siblings.
    pub fn last_index(&self) -> usize {
        // non-empty by construction
        self.0[self.0.len() - 1]
    }

    /// Path of the parent node, `None` for a root path.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Path of this node's child at `index`.
    pub fn child(&self, index: usize) -> NodePath {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Same path with the final index replaced.
    pub fn with_last_index(&self, index: usize) -> NodePath {
        let mut indices = self.0.clone();
        let last = indices.len() - 1;
        indices[last] = index;
        Self(indices)
    }

    /// Segment-wise prefix test; a path starts with itself.
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True if `other` lies strictly inside the subtree addressed by `self`.
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        other.depth() > self.depth() && other.starts_with(self)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!("{SEPARATOR}{CHILDREN_MARKER}{SEPARATOR}");
        write!(f, "{}", self.0.iter().join(&separator))
    }
}

impl FromStr for NodePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
