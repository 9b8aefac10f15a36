//! Outline nodes and immutable tree snapshots.
//!
//! Subtrees are shared between snapshots through `Arc`. A mutation copies only
//! the nodes along the edited path, so `Arc::ptr_eq` tells whether a subtree
//! changed between two snapshots.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::path::NodePath;

/// Shared handle to a node; identity is `Arc::ptr_eq`.
pub type NodeRef = Arc<Node>;

/// A titled outline entry.
///
/// `children` is either absent (leaf) or non-empty; an empty list is never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    title: String,
    #[serde(default, skip_serializing_if = "is_false")]
    collapsed: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_children"
    )]
    children: Option<Vec<NodeRef>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn non_empty_children<'de, D>(deserializer: D) -> Result<Option<Vec<NodeRef>>, D::Error>
where
    D: Deserializer<'de>,
{
    let children: Option<Vec<NodeRef>> = Option::deserialize(deserializer)?;
    Ok(children.filter(|c| !c.is_empty()))
}

impl Node {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            collapsed: false,
            children: None,
        }
    }

    /// Replace the children; an empty iterator makes the node a leaf.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = non_empty(children.into_iter().map(Arc::new).collect());
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Child list, `None` for a leaf. Never returns an empty slice.
    pub fn children(&self) -> Option<&[NodeRef]> {
        self.children.as_deref()
    }

    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of nodes in this subtree, including this node.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children()
            .unwrap_or_default()
            .iter()
            .map(|c| c.subtree_size())
            .sum::<usize>()
    }

    /// Copy of this node with a new child list, sharing everything else.
    pub(crate) fn with_shared_children(&self, children: Vec<NodeRef>) -> Node {
        Node {
            title: self.title.clone(),
            collapsed: self.collapsed,
            children: non_empty(children),
        }
    }

    pub(crate) fn with_attribute(&self, attribute: &Attribute) -> Node {
        let mut node = self.clone();
        match attribute {
            Attribute::Title(title) => node.title = title.clone(),
            Attribute::Collapsed(collapsed) => node.collapsed = *collapsed,
        }
        node
    }
}

fn non_empty(children: Vec<NodeRef>) -> Option<Vec<NodeRef>> {
    if children.is_empty() {
        None
    } else {
        Some(children)
    }
}

/// A settable node attribute: the typed form of a `(key, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Title(String),
    Collapsed(bool),
}

impl Attribute {
    pub const TITLE: &'static str = "title";
    pub const COLLAPSED: &'static str = "collapsed";

    /// Build an attribute from its textual key and value.
    pub fn parse(key: &str, value: &str) -> DomainResult<Self> {
        match key {
            Self::TITLE => Ok(Self::Title(value.to_string())),
            Self::COLLAPSED => value
                .parse::<bool>()
                .map(Self::Collapsed)
                .map_err(|_| DomainError::InvalidAttributeValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
            other => Err(DomainError::UnknownAttribute(other.to_string())),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Title(_) => Self::TITLE,
            Self::Collapsed(_) => Self::COLLAPSED,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title(title) => write!(f, "{}={}", self.key(), title),
            Self::Collapsed(collapsed) => write!(f, "{}={}", self.key(), collapsed),
        }
    }
}

/// An immutable snapshot of the outline: an ordered forest of root nodes.
///
/// Cloning a tree is cheap: only the root handles are copied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    roots: Vec<NodeRef>,
}

impl Tree {
    pub fn new(roots: impl IntoIterator<Item = Node>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_shared(roots: Vec<NodeRef>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[NodeRef] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Resolve a path; `None` if it is dangling.
    pub fn get(&self, path: &NodePath) -> Option<&NodeRef> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for &index in rest {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.get(path).is_some()
    }

    /// Sibling list below `parent` (the roots for `None`). A leaf parent has
    /// an empty list; a dangling parent yields `None`.
    pub fn children_of(&self, parent: Option<&NodePath>) -> Option<&[NodeRef]> {
        match parent {
            None => Some(self.roots.as_slice()),
            Some(path) => self.get(path).map(|n| n.children().unwrap_or_default()),
        }
    }

    /// Total number of nodes in the forest.
    #[instrument(level = "trace", skip(self))]
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.subtree_size()).sum()
    }

    /// Length of the longest root-to-leaf chain; 0 for an empty forest.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            1 + node
                .children()
                .unwrap_or_default()
                .iter()
                .map(|c| depth_of(c))
                .max()
                .unwrap_or(0)
        }
        self.roots.iter().map(|r| depth_of(r)).max().unwrap_or(0)
    }

    /// First node in document order.
    pub fn first_path(&self) -> Option<NodePath> {
        (!self.roots.is_empty()).then(|| NodePath::root(0))
    }

    /// Last node in document order: the deepest last descendant of the last root.
    pub fn last_path(&self) -> Option<NodePath> {
        let mut path = NodePath::root(self.roots.len().checked_sub(1)?);
        while let Some(children) = self.get(&path).and_then(|n| n.children()) {
            path = path.child(children.len() - 1);
        }
        Some(path)
    }

    /// Pre-order iterator over `(path, node)` pairs.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Re-resolve a node by identity in this snapshot.
    #[instrument(level = "trace", skip_all)]
    pub fn find(&self, node: &NodeRef) -> Option<NodePath> {
        self.iter()
            .find(|(_, candidate)| Arc::ptr_eq(candidate, node))
            .map(|(path, _)| path)
    }
}

pub struct TreeIterator<'a> {
    stack: Vec<(NodePath, &'a NodeRef)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        // Push in reverse order for left-to-right traversal
        let stack = tree
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| (NodePath::root(i), node))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodePath, &'a NodeRef);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        if let Some(children) = node.children() {
            for (i, child) in children.iter().enumerate().rev() {
                self.stack.push((path.child(i), child));
            }
        }
        Some((path, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Tree::new([
            Node::new("A").with_children([
                Node::new("B").with_children([Node::new("B1")]),
                Node::new("C"),
            ]),
            Node::new("D"),
        ])
    }

    #[test]
    fn given_empty_children_when_building_node_then_node_is_leaf() {
        let node = Node::new("leaf").with_children(Vec::<Node>::new());
        assert!(node.is_leaf());
        assert_eq!(node.children(), None);
    }

    #[test]
    fn given_tree_when_iterating_then_visits_in_pre_order() {
        let titles: Vec<String> = sample()
            .iter()
            .map(|(path, node)| format!("{}={}", path, node.title()))
            .collect();
        assert_eq!(
            titles,
            vec![
                "0=A",
                "0.children.0=B",
                "0.children.0.children.0=B1",
                "0.children.1=C",
                "1=D",
            ]
        );
    }

    #[test]
    fn given_tree_when_measuring_then_counts_and_depth_match() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(Tree::default().depth(), 0);
    }

    #[test]
    fn given_tree_when_resolving_boundaries_then_first_and_last_paths() {
        let tree = sample();
        assert_eq!(tree.first_path(), Some(NodePath::root(0)));
        assert_eq!(tree.last_path(), Some(NodePath::root(1)));
        assert_eq!(Tree::default().first_path(), None);
        assert_eq!(Tree::default().last_path(), None);
    }

    #[test]
    fn given_dangling_path_when_resolving_then_none() {
        let tree = sample();
        assert!(tree.get(&NodePath::parse("0.children.5").unwrap()).is_none());
        assert!(tree.get(&NodePath::parse("1.children.0").unwrap()).is_none());
        assert_eq!(tree.children_of(Some(&NodePath::root(1))), Some(&[][..]));
        assert_eq!(tree.children_of(Some(&NodePath::root(9))), None);
    }

    #[test]
    fn given_node_handle_when_finding_then_returns_its_path() {
        let tree = sample();
        let c = tree.get(&NodePath::parse("0.children.1").unwrap()).unwrap().clone();
        assert_eq!(tree.find(&c), Some(NodePath::parse("0.children.1").unwrap()));

        let lookalike = Arc::new(Node::new("C"));
        assert_eq!(tree.find(&lookalike), None);
    }

    #[test]
    fn given_json_with_empty_children_when_deserializing_then_children_absent() {
        let tree: Tree =
            serde_json::from_str(r#"[{"title":"A","children":[]},{"title":"B","collapsed":true}]"#)
                .unwrap();
        assert!(tree.roots()[0].is_leaf());
        assert!(tree.roots()[1].is_collapsed());
    }

    #[test]
    fn given_attribute_text_when_parsing_then_typed_or_error() {
        assert_eq!(
            Attribute::parse("title", "x").unwrap(),
            Attribute::Title("x".into())
        );
        assert_eq!(
            Attribute::parse("collapsed", "true").unwrap(),
            Attribute::Collapsed(true)
        );
        assert!(matches!(
            Attribute::parse("collapsed", "yes"),
            Err(DomainError::InvalidAttributeValue { .. })
        ));
        assert!(matches!(
            Attribute::parse("color", "red"),
            Err(DomainError::UnknownAttribute(_))
        ));
    }
}
