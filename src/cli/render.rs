//! Terminal rendering of outline trees via termtree.

use termtree::Tree as TermTree;

use crate::domain::{NodePath, NodeRef, Tree};

pub trait ToTermTree {
    /// One termtree per root, labelled `title [path]`.
    fn to_term_trees(&self) -> Vec<TermTree<String>>;
}

impl ToTermTree for Tree {
    fn to_term_trees(&self) -> Vec<TermTree<String>> {
        self.roots()
            .iter()
            .enumerate()
            .map(|(i, root)| build(root, NodePath::root(i)))
            .collect()
    }
}

fn build(node: &NodeRef, path: NodePath) -> TermTree<String> {
    let leaves = node
        .children()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, child)| build(child, path.child(i)));
    TermTree::new(label(node, &path)).with_leaves(leaves)
}

fn label(node: &NodeRef, path: &NodePath) -> String {
    let marker = if node.is_collapsed() { " (collapsed)" } else { "" };
    format!("{} [{}]{}", node.title(), path, marker)
}

/// The whole forest as text; an empty tree renders as `(empty)`.
pub fn render_forest(tree: &Tree) -> String {
    if tree.is_empty() {
        return "(empty)\n".to_string();
    }
    tree.to_term_trees()
        .iter()
        .map(|t| t.to_string())
        .collect()
}
