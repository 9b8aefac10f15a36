//! Structural edits producing new tree snapshots.
//!
//! Every operation leaves its input untouched and returns a new [`Tree`].
//! Only the nodes on the path to the edited sibling list are copied; every
//! other subtree is shared with the input snapshot.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Attribute, Node, NodeRef, Tree};
use crate::domain::path::NodePath;
use crate::domain::placement::{validate_target, MovePosition};

/// Replace one attribute of the node at `path`.
///
/// The node and its ancestors get new identities; all other subtrees are
/// shared with `tree`.
#[instrument(level = "trace", skip_all, fields(path = %path, attribute = %attribute))]
pub fn set_attribute(tree: &Tree, path: &NodePath, attribute: Attribute) -> DomainResult<Tree> {
    let index = path.last_index();
    let updated = Arc::new(resolve(tree, path)?.with_attribute(&attribute));
    edit_siblings(tree, path.parent().as_ref(), |siblings| {
        let slot = siblings
            .get_mut(index)
            .ok_or_else(|| DomainError::PathNotFound(path.clone()))?;
        *slot = updated;
        Ok(())
    })
}

/// Insert `node` at `index` below `parent`, or among the roots for `None`.
///
/// Fails with `IndexOutOfRange` if `index` exceeds the current sibling count.
#[instrument(level = "trace", skip(tree, node))]
pub fn insert_node(
    tree: &Tree,
    parent: Option<&NodePath>,
    index: usize,
    node: Node,
) -> DomainResult<Tree> {
    insert_shared(tree, parent, index, Arc::new(node))
}

/// Remove the node at `path` together with its subtree.
///
/// A parent left without children becomes a leaf.
#[instrument(level = "trace", skip_all, fields(path = %path))]
pub fn delete_node(tree: &Tree, path: &NodePath) -> DomainResult<Tree> {
    resolve(tree, path)?;
    let index = path.last_index();
    edit_siblings(tree, path.parent().as_ref(), |siblings| {
        if index >= siblings.len() {
            return Err(DomainError::PathNotFound(path.clone()));
        }
        siblings.remove(index);
        Ok(())
    })
}

/// Relocate the subtree at `source` relative to `target`.
///
/// The source is detached first and the placement is computed against the
/// detached tree, so a target that followed the source under the same parent
/// moves up by one index. The moved subtree keeps its identity.
#[instrument(
    level = "trace",
    skip_all,
    fields(source = %source, target = %target, position = %position)
)]
pub fn move_node(
    tree: &Tree,
    source: &NodePath,
    target: &NodePath,
    position: MovePosition,
) -> DomainResult<Tree> {
    if !validate_target(source, target) {
        return Err(DomainError::IllegalMove {
            from: source.clone(),
            to: target.clone(),
        });
    }
    let moved = resolve(tree, source)?.clone();
    resolve(tree, target)?;

    let detached = delete_node(tree, source)?;
    let effective = shift_after_detach(source, target)?;

    let (parent, index) = match position {
        MovePosition::Adopt => (Some(effective.clone()), 0),
        MovePosition::AdoptLast => {
            let count = resolve(&detached, &effective)?.child_count();
            (Some(effective.clone()), count)
        }
        MovePosition::Before => (effective.parent(), effective.last_index()),
        MovePosition::After => (effective.parent(), effective.last_index() + 1),
    };
    debug!(
        "move_node: {} {} {} (resolved to {} after detach)",
        source, position, target, effective
    );
    insert_shared(&detached, parent.as_ref(), index, moved)
}

fn resolve<'a>(tree: &'a Tree, path: &NodePath) -> DomainResult<&'a NodeRef> {
    tree.get(path)
        .ok_or_else(|| DomainError::PathNotFound(path.clone()))
}

fn insert_shared(
    tree: &Tree,
    parent: Option<&NodePath>,
    index: usize,
    node: NodeRef,
) -> DomainResult<Tree> {
    if let Some(parent) = parent {
        resolve(tree, parent)?;
    }
    edit_siblings(tree, parent, |siblings| {
        if index > siblings.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, node);
        Ok(())
    })
}

/// Where `target` ends up once `source` has been removed from the tree.
///
/// Only targets under the source's parent with a larger index at the source's
/// depth are affected; they shift down by one at that depth.
fn shift_after_detach(source: &NodePath, target: &NodePath) -> DomainResult<NodePath> {
    let level = source.depth() - 1;
    let shared_prefix = &source.indices()[..level];
    let affected = target.depth() > level
        && target.indices()[..level] == *shared_prefix
        && target.indices()[level] > source.last_index();
    if !affected {
        return Ok(target.clone());
    }

    let mut indices = target.indices().to_vec();
    indices[level] -= 1;
    NodePath::from_indices(indices)
}

/// Apply `edit` to the sibling list below `parent` and rebuild the ancestors.
fn edit_siblings<F>(tree: &Tree, parent: Option<&NodePath>, edit: F) -> DomainResult<Tree>
where
    F: FnOnce(&mut Vec<NodeRef>) -> DomainResult<()>,
{
    let roots = match parent {
        None => {
            let mut roots = tree.roots().to_vec();
            edit(&mut roots)?;
            roots
        }
        Some(parent) => rebuild(tree.roots(), parent.indices(), parent, edit)?,
    };
    Ok(Tree::from_shared(roots))
}

fn rebuild<F>(
    siblings: &[NodeRef],
    indices: &[usize],
    parent: &NodePath,
    edit: F,
) -> DomainResult<Vec<NodeRef>>
where
    F: FnOnce(&mut Vec<NodeRef>) -> DomainResult<()>,
{
    let Some((&index, rest)) = indices.split_first() else {
        let mut edited = siblings.to_vec();
        edit(&mut edited)?;
        return Ok(edited);
    };

    let node = siblings
        .get(index)
        .ok_or_else(|| DomainError::PathNotFound(parent.clone()))?;
    let children = rebuild(node.children().unwrap_or_default(), rest, parent, edit)?;

    let mut copied = siblings.to_vec();
    copied[index] = Arc::new(node.with_shared_children(children));
    Ok(copied)
}
