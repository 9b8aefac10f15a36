//! Editing session: the latest tree snapshot plus ephemeral UI state.
//!
//! Selection, in-progress edits and drag previews live here, outside the
//! persistent tree. A presentation layer owns one session and drives it with
//! explicit calls; every mutation replaces the snapshot and discards any drag
//! in flight.

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    self, classify, validate_target, Attribute, DomainError, MovePosition, Node, NodePath, Point,
    TargetBox, Tree,
};

/// A title edit in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub path: NodePath,
    pub buffer: String,
}

/// Placement currently previewed under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPreview {
    pub target: NodePath,
    pub position: MovePosition,
}

/// A drag gesture in flight. Paths refer to the snapshot the drag started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub source: NodePath,
    pub preview: Option<DropPreview>,
}

#[derive(Debug, Clone)]
pub struct OutlineSession {
    tree: Tree,
    selection: Option<NodePath>,
    editing: Option<EditState>,
    drag: Option<DragState>,
    zone_width: f64,
}

impl OutlineSession {
    /// Start a session on `tree`; `zone_width` is the adoption zone used when
    /// classifying drag positions.
    pub fn new(tree: Tree, zone_width: f64) -> Self {
        Self {
            tree,
            selection: None,
            editing: None,
            drag: None,
            zone_width,
        }
    }

    /// The latest snapshot.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn selection(&self) -> Option<&NodePath> {
        self.selection.as_ref()
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn zone_width(&self) -> f64 {
        self.zone_width
    }

    fn replace_tree(&mut self, tree: Tree) {
        self.tree = tree;
        self.drag = None;
    }

    fn ensure_exists(&self, path: &NodePath) -> ApplicationResult<()> {
        if self.tree.contains(path) {
            Ok(())
        } else {
            Err(DomainError::PathNotFound(path.clone()).into())
        }
    }

    // ------------------------------------------------------------
    // Selection and keyboard navigation
    // ------------------------------------------------------------

    pub fn select(&mut self, path: NodePath) -> ApplicationResult<()> {
        self.ensure_exists(&path)?;
        self.selection = Some(path);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Move the selection to the document-order predecessor.
    pub fn select_previous(&mut self) -> ApplicationResult<Option<NodePath>> {
        self.step_selection(domain::previous)
    }

    /// Move the selection to the document-order successor.
    pub fn select_next(&mut self) -> ApplicationResult<Option<NodePath>> {
        self.step_selection(domain::next)
    }

    /// At a boundary nothing changes. Otherwise a running edit is committed
    /// and editing continues on the newly selected node.
    fn step_selection(
        &mut self,
        step: fn(&Tree, &NodePath) -> Option<NodePath>,
    ) -> ApplicationResult<Option<NodePath>> {
        let Some(current) = self.selection.clone() else {
            return Ok(None);
        };
        let Some(target) = step(&self.tree, &current) else {
            debug!("step_selection: boundary at {}", current);
            return Ok(None);
        };

        if self.editing.is_some() {
            self.commit_edit()?;
            self.begin_edit(target.clone())?;
        } else {
            self.selection = Some(target.clone());
        }
        Ok(Some(target))
    }

    // ------------------------------------------------------------
    // Title editing
    // ------------------------------------------------------------

    /// Start editing the title at `path`; also selects it.
    pub fn begin_edit(&mut self, path: NodePath) -> ApplicationResult<()> {
        let title = self
            .tree
            .get(&path)
            .map(|n| n.title().to_string())
            .ok_or_else(|| DomainError::PathNotFound(path.clone()))?;
        self.selection = Some(path.clone());
        self.editing = Some(EditState {
            path,
            buffer: title,
        });
        Ok(())
    }

    /// Replace the edit buffer; ignored when nothing is being edited.
    pub fn update_edit(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.buffer = text.into();
        }
    }

    /// Write the edit buffer back if it differs from the stored title.
    ///
    /// Ends editing and clears the selection. Returns whether the tree changed.
    #[instrument(level = "debug", skip(self))]
    pub fn commit_edit(&mut self) -> ApplicationResult<bool> {
        let Some(edit) = self.editing.take() else {
            return Ok(false);
        };
        self.selection = None;

        let unchanged = self
            .tree
            .get(&edit.path)
            .is_some_and(|n| n.title() == edit.buffer);
        if unchanged {
            return Ok(false);
        }
        let tree = domain::set_attribute(&self.tree, &edit.path, Attribute::Title(edit.buffer))?;
        self.replace_tree(tree);
        Ok(true)
    }

    /// Drop the edit buffer; ends editing and clears the selection.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.selection = None;
    }

    // ------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------

    /// Flip the collapsed flag of a node with children. Leaves are left alone.
    #[instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn toggle_collapsed(&mut self, path: &NodePath) -> ApplicationResult<bool> {
        let node = self
            .tree
            .get(path)
            .ok_or_else(|| DomainError::PathNotFound(path.clone()))?;
        if node.is_leaf() {
            debug!("toggle_collapsed: {} is a leaf", path);
            return Ok(false);
        }
        let attribute = Attribute::Collapsed(!node.is_collapsed());
        let tree = domain::set_attribute(&self.tree, path, attribute)?;
        self.replace_tree(tree);
        Ok(true)
    }

    /// Insert `node` and select it. Returns the new node's path.
    #[instrument(level = "debug", skip(self, node))]
    pub fn insert(
        &mut self,
        parent: Option<&NodePath>,
        index: usize,
        node: Node,
    ) -> ApplicationResult<NodePath> {
        if let Some(edit) = &self.editing {
            return Err(ApplicationError::EditInProgress(edit.path.clone()));
        }
        let tree = domain::insert_node(&self.tree, parent, index, node)?;
        let path = match parent {
            Some(parent) => parent.child(index),
            None => NodePath::root(index),
        };
        self.replace_tree(tree);
        self.selection = Some(path.clone());
        Ok(path)
    }

    /// Delete the subtree at `path`; selection and editing are cleared.
    #[instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn delete(&mut self, path: &NodePath) -> ApplicationResult<()> {
        let tree = domain::delete_node(&self.tree, path)?;
        self.replace_tree(tree);
        self.selection = None;
        self.editing = None;
        Ok(())
    }

    // ------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------

    /// Begin dragging `source`. Refused while a title edit is in progress.
    pub fn start_drag(&mut self, source: NodePath) -> ApplicationResult<()> {
        if let Some(edit) = &self.editing {
            return Err(ApplicationError::EditInProgress(edit.path.clone()));
        }
        self.ensure_exists(&source)?;
        self.drag = Some(DragState {
            source,
            preview: None,
        });
        Ok(())
    }

    /// Update the placement preview for the pointer over `target`.
    ///
    /// Returns `None` (and clears the preview) when no drag is running or the
    /// target is the dragged node or inside it.
    pub fn drag_over(
        &mut self,
        target: &NodePath,
        pointer: Point,
        target_box: &TargetBox,
    ) -> Option<MovePosition> {
        let zone_width = self.zone_width;
        let drag = self.drag.as_mut()?;
        if !validate_target(&drag.source, target) {
            drag.preview = None;
            return None;
        }
        let position = classify(pointer, target_box, zone_width);
        drag.preview = Some(DropPreview {
            target: target.clone(),
            position,
        });
        Some(position)
    }

    /// The pointer left the current target.
    pub fn drag_leave(&mut self) {
        if let Some(drag) = self.drag.as_mut() {
            drag.preview = None;
        }
    }

    /// Finish the drag on `target`.
    ///
    /// Moves only if the last preview was for this target. The drag state is
    /// discarded either way. On success the selection follows the moved node
    /// and its new path is returned.
    #[instrument(level = "debug", skip_all, fields(target = %target))]
    pub fn drop_on(&mut self, target: &NodePath) -> ApplicationResult<Option<NodePath>> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        let Some(preview) = drag.preview.filter(|p| &p.target == target) else {
            debug!("drop_on: no preview for {}", target);
            return Ok(None);
        };

        let Some(moved) = self.tree.get(&drag.source).cloned() else {
            return Err(DomainError::PathNotFound(drag.source).into());
        };
        let tree = domain::move_node(&self.tree, &drag.source, target, preview.position)?;
        let new_path = tree.find(&moved);
        self.replace_tree(tree);
        self.selection = new_path.clone();
        Ok(new_path)
    }

    /// Abandon the drag without moving anything.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}
