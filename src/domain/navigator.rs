//! Document-order (pre-order) navigation between node paths.
//!
//! Navigation never fails: a document boundary or a dangling path yields `None`.

use tracing::{instrument, trace};

use crate::domain::node::Tree;
use crate::domain::path::NodePath;

/// Pre-order predecessor of `path`.
///
/// Steps to the preceding sibling and descends into its last child until a
/// leaf is reached. The first child of a node steps up to the parent; the
/// first root has no predecessor.
#[instrument(level = "trace", skip_all, fields(path = %path))]
pub fn previous(tree: &Tree, path: &NodePath) -> Option<NodePath> {
    tree.get(path)?;

    let index = path.last_index();
    if index == 0 {
        return path.parent();
    }

    let mut step = path.with_last_index(index - 1);
    while let Some(children) = tree.get(&step).and_then(|n| n.children()) {
        step = step.child(children.len() - 1);
    }
    trace!("previous: {} -> {}", path, step);
    Some(step)
}

/// Pre-order successor of `path`.
///
/// Descends into the first child if there is one, otherwise walks up until an
/// ancestor (or the node itself) has a following sibling.
#[instrument(level = "trace", skip_all, fields(path = %path))]
pub fn next(tree: &Tree, path: &NodePath) -> Option<NodePath> {
    let node = tree.get(path)?;
    if !node.is_leaf() {
        return Some(path.child(0));
    }

    let mut current = path.clone();
    loop {
        let parent = current.parent();
        let siblings = tree.children_of(parent.as_ref())?;
        let following = current.last_index() + 1;
        if following < siblings.len() {
            let found = current.with_last_index(following);
            trace!("next: {} -> {}", path, found);
            return Some(found);
        }
        // Exhausting the roots ends the document.
        current = parent?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Node;

    fn p(text: &str) -> NodePath {
        NodePath::parse(text).unwrap()
    }

    fn scenario_tree() -> Tree {
        Tree::new([Node::new("A").with_children([Node::new("B"), Node::new("C")])])
    }

    #[test]
    fn given_scenario_tree_when_stepping_next_then_visits_children_then_ends() {
        let tree = scenario_tree();
        assert_eq!(next(&tree, &p("0")), Some(p("0.children.0")));
        assert_eq!(next(&tree, &p("0.children.0")), Some(p("0.children.1")));
        assert_eq!(next(&tree, &p("0.children.1")), None);
    }

    #[test]
    fn given_scenario_tree_when_stepping_previous_then_reverses_next() {
        let tree = scenario_tree();
        assert_eq!(previous(&tree, &p("0.children.1")), Some(p("0.children.0")));
        assert_eq!(previous(&tree, &p("0.children.0")), Some(p("0")));
        assert_eq!(previous(&tree, &p("0")), None);
    }

    #[test]
    fn given_deep_preceding_sibling_when_stepping_previous_then_lands_on_deepest_last_child() {
        let tree = Tree::new([
            Node::new("A").with_children([
                Node::new("B"),
                Node::new("C").with_children([Node::new("C1"), Node::new("C2")]),
            ]),
            Node::new("D"),
        ]);
        assert_eq!(previous(&tree, &p("1")), Some(p("0.children.1.children.1")));
    }

    #[test]
    fn given_last_child_of_nested_branch_when_stepping_next_then_climbs_to_ancestor_sibling() {
        let tree = Tree::new([
            Node::new("A").with_children([Node::new("B").with_children([Node::new("B1")])]),
            Node::new("D"),
        ]);
        assert_eq!(next(&tree, &p("0.children.0.children.0")), Some(p("1")));
    }

    #[test]
    fn given_dangling_path_when_navigating_then_none() {
        let tree = scenario_tree();
        assert_eq!(next(&tree, &p("0.children.7")), None);
        assert_eq!(previous(&tree, &p("3")), None);
        assert_eq!(next(&Tree::default(), &p("0")), None);
    }
}
