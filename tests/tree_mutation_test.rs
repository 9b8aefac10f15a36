//! Tests for copy-on-write tree mutations

use std::sync::Arc;

use outliner::domain::{
    delete_node, insert_node, move_node, set_attribute, Attribute, DomainError, MovePosition, Node,
    NodePath, Tree,
};
use outliner::util::testing::{init_test_setup, sample_outline};
use rstest::rstest;

fn p(text: &str) -> NodePath {
    NodePath::parse(text).expect("valid path")
}

fn abc() -> Tree {
    Tree::new([Node::new("A").with_children([Node::new("B"), Node::new("C")])])
}

/// Pre-order `path=title` listing for compact assertions.
fn outline(tree: &Tree) -> Vec<String> {
    tree.iter()
        .map(|(path, node)| format!("{}={}", path, node.title()))
        .collect()
}

// ============================================================
// set_attribute
// ============================================================

#[test]
fn given_title_when_setting_then_only_path_to_node_is_copied() {
    // Arrange
    init_test_setup();
    let tree = sample_outline();
    let target = p("0.children.0.children.1");

    // Act
    let updated = set_attribute(&tree, &target, Attribute::Title("Plums".into())).unwrap();

    // Assert
    assert_eq!(updated.get(&target).unwrap().title(), "Plums");
    for (path, node) in updated.iter() {
        let before = tree.get(&path).unwrap();
        let on_path = path == target || path.is_ancestor_of(&target);
        assert_eq!(
            Arc::ptr_eq(before, node),
            !on_path,
            "unexpected identity at {path}"
        );
    }
    // the input snapshot is untouched
    assert_eq!(tree.get(&target).unwrap().title(), "Pears");
}

#[test]
fn given_collapsed_flag_when_setting_then_flag_changes() {
    let tree = sample_outline();
    let updated = set_attribute(&tree, &p("0"), Attribute::Collapsed(true)).unwrap();
    assert!(updated.get(&p("0")).unwrap().is_collapsed());
    assert!(Arc::ptr_eq(&tree.roots()[1], &updated.roots()[1]));
}

#[test]
fn given_dangling_path_when_setting_then_path_not_found() {
    let result = set_attribute(&abc(), &p("0.children.9"), Attribute::Title("x".into()));
    assert_eq!(result, Err(DomainError::PathNotFound(p("0.children.9"))));
}

// ============================================================
// insert_node
// ============================================================

#[rstest]
#[case(None, 0, vec!["0=X", "1=A", "1.children.0=B", "1.children.1=C"])]
#[case(None, 1, vec!["0=A", "0.children.0=B", "0.children.1=C", "1=X"])]
#[case(Some("0"), 1, vec!["0=A", "0.children.0=B", "0.children.1=X", "0.children.2=C"])]
#[case(Some("0.children.0"), 0, vec!["0=A", "0.children.0=B", "0.children.0.children.0=X", "0.children.1=C"])]
fn given_parent_and_index_when_inserting_then_node_lands_there(
    #[case] parent: Option<&str>,
    #[case] index: usize,
    #[case] expected: Vec<&str>,
) {
    let parent = parent.map(p);
    let inserted = insert_node(&abc(), parent.as_ref(), index, Node::new("X")).unwrap();
    assert_eq!(outline(&inserted), expected);
}

#[test]
fn given_index_beyond_sibling_count_when_inserting_then_out_of_range_and_input_unchanged() {
    let tree = abc();
    let result = insert_node(&tree, None, 2, Node::new("X"));
    assert_eq!(result, Err(DomainError::IndexOutOfRange { index: 2, len: 1 }));
    assert_eq!(tree, abc());
}

#[test]
fn given_empty_tree_when_inserting_root_then_single_node() {
    let inserted = insert_node(&Tree::default(), None, 0, Node::new("first")).unwrap();
    assert_eq!(outline(&inserted), vec!["0=first"]);
}

// ============================================================
// delete_node
// ============================================================

#[test]
fn given_only_child_when_deleting_then_parent_becomes_leaf() {
    // Arrange
    let tree = Tree::new([Node::new("A").with_children([Node::new("B")])]);

    // Act
    let deleted = delete_node(&tree, &p("0.children.0")).unwrap();

    // Assert
    assert_eq!(deleted.roots()[0].children(), None);
    assert_eq!(deleted, Tree::new([Node::new("A")]));
}

#[test]
fn given_branch_when_deleting_then_whole_subtree_goes() {
    let tree = sample_outline();
    let deleted = delete_node(&tree, &p("0.children.0")).unwrap();
    assert_eq!(deleted.node_count(), tree.node_count() - 3);
    assert_eq!(deleted.get(&p("0.children.0")).unwrap().title(), "Bread");
    assert!(Arc::ptr_eq(&tree.roots()[2], &deleted.roots()[2]));
}

#[test]
fn given_dangling_path_when_deleting_then_path_not_found() {
    assert!(matches!(
        delete_node(&abc(), &p("1")),
        Err(DomainError::PathNotFound(_))
    ));
}

// ============================================================
// move_node
// ============================================================

#[test]
fn given_second_child_when_moving_before_first_then_order_swaps() {
    let moved = move_node(&abc(), &p("0.children.1"), &p("0.children.0"), MovePosition::Before)
        .unwrap();
    assert_eq!(
        moved,
        Tree::new([Node::new("A").with_children([Node::new("C"), Node::new("B")])])
    );
}

#[test]
fn given_root_when_adopting_into_own_child_then_illegal_move_and_tree_unchanged() {
    let tree = abc();
    let result = move_node(&tree, &p("0"), &p("0.children.0"), MovePosition::Adopt);
    assert_eq!(
        result,
        Err(DomainError::IllegalMove {
            from: p("0"),
            to: p("0.children.0"),
        })
    );
    assert_eq!(tree, abc());
}

#[test]
fn given_node_when_moving_onto_itself_then_illegal_move() {
    let result = move_node(&abc(), &p("0.children.1"), &p("0.children.1"), MovePosition::After);
    assert!(matches!(result, Err(DomainError::IllegalMove { .. })));
}

#[rstest]
// a later target under the same parent shifts down after detach
#[case("0.children.0", "0.children.1", MovePosition::After, vec!["Bread", "Fruit"])]
#[case("0.children.0", "0.children.1", MovePosition::Before, vec!["Fruit", "Bread"])]
#[case("0.children.1", "0.children.0", MovePosition::Before, vec!["Bread", "Fruit"])]
#[case("0.children.1", "0.children.0", MovePosition::After, vec!["Fruit", "Bread"])]
fn given_siblings_when_moving_then_index_shift_is_applied(
    #[case] source: &str,
    #[case] target: &str,
    #[case] position: MovePosition,
    #[case] expected: Vec<&str>,
) {
    let moved = move_node(&sample_outline(), &p(source), &p(target), position).unwrap();
    let titles: Vec<&str> = moved.roots()[0]
        .children()
        .unwrap()
        .iter()
        .map(|n| n.title())
        .collect();
    assert_eq!(titles, expected);
}

#[test]
fn given_leaf_when_adopted_then_becomes_first_child_of_target() {
    let moved = move_node(&sample_outline(), &p("2"), &p("0.children.0"), MovePosition::Adopt)
        .unwrap();
    assert_eq!(moved.get(&p("0.children.0.children.0")).unwrap().title(), "Notes");
    assert_eq!(moved.get(&p("0.children.0.children.1")).unwrap().title(), "Apples");
    assert_eq!(moved.roots().len(), 2);
}

#[test]
fn given_leaf_when_adopted_last_then_becomes_last_child_of_target() {
    let moved = move_node(&sample_outline(), &p("2"), &p("1"), MovePosition::AdoptLast).unwrap();
    assert_eq!(moved.get(&p("1.children.1")).unwrap().title(), "Notes");
}

#[test]
fn given_target_leaf_when_adopting_then_target_gains_children() {
    let moved = move_node(&sample_outline(), &p("1.children.0"), &p("2"), MovePosition::AdoptLast)
        .unwrap();
    // Chores lost its only child and is now a leaf
    assert!(moved.get(&p("1")).unwrap().is_leaf());
    assert_eq!(moved.get(&p("2.children.0")).unwrap().title(), "Laundry");
}

#[test]
fn given_nested_node_when_moving_to_root_level_then_subtree_keeps_identity() {
    // Arrange
    let tree = sample_outline();
    let fruit = tree.get(&p("0.children.0")).unwrap().clone();

    // Act
    let moved = move_node(&tree, &p("0.children.0"), &p("2"), MovePosition::After).unwrap();

    // Assert
    assert_eq!(moved.find(&fruit), Some(p("3")));
    assert_eq!(moved.node_count(), tree.node_count());
    assert_eq!(
        outline(&moved)[4..],
        ["2=Notes", "3=Fruit", "3.children.0=Apples", "3.children.1=Pears"]
    );
}

#[test]
fn given_node_when_adopted_by_later_sibling_descendant_then_target_resolved_after_detach() {
    // Groceries(0) moves into Laundry (1.children.0), which becomes 0.children.0
    let moved = move_node(&sample_outline(), &p("0"), &p("1.children.0"), MovePosition::Adopt)
        .unwrap();
    assert_eq!(moved.get(&p("0")).unwrap().title(), "Chores");
    assert_eq!(
        moved.get(&p("0.children.0.children.0")).unwrap().title(),
        "Groceries"
    );
}
