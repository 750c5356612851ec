//! Tree controller: edit verbs and identity-preserving reload
//!
//! Owns the `original` collection (reset target) and a [`TreeModel`] over the
//! `current` collection (live copy). View state (selection, collapsed groups)
//! is keyed by identifier, so it survives any reshuffling of rows.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::application::selection::{EditBuffer, Selection};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    Collection, CollectionRef, Identifier, Node, NodeKind, TreeError, TreeModel, TreeResult,
};

pub struct TreeController {
    settings: Settings,
    original: CollectionRef,
    model: TreeModel,
    selection: Selection,
    collapsed: HashSet<Identifier>,
    queued_selection: Option<Identifier>,
    edit_buffer: Option<EditBuffer>,
}

impl TreeController {
    /// Takes ownership of both collections; they never share objects.
    ///
    /// A `current` holding any handle of `original` is replaced by a
    /// retained-identity deep copy of itself.
    pub fn new(original: Collection, current: Collection, settings: Settings) -> Self {
        let current = if current.shares_objects_with(&original) {
            debug!("current shares objects with original, detaching");
            current.deep_copy(true)
        } else {
            current
        };
        Self {
            settings,
            original: original.into_ref(),
            model: TreeModel::new(current.into_ref()),
            selection: Selection::NoSelection,
            collapsed: HashSet::new(),
            queued_selection: None,
            edit_buffer: None,
        }
    }

    /// Starts editing a retained-identity copy of `original`.
    pub fn from_original(original: Collection, settings: Settings) -> Self {
        let current = original.deep_copy(true);
        Self::new(original, current, settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    /// Mutable model access, e.g. to register listeners.
    pub fn model_mut(&mut self) -> &mut TreeModel {
        &mut self.model
    }

    pub fn original(&self) -> &CollectionRef {
        &self.original
    }

    /// The live collection; mutate it out-of-band and call [`reload`](Self::reload).
    pub fn current(&self) -> &CollectionRef {
        self.model.collection()
    }

    // ------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.node()
    }

    /// Selects the in-tree node with `node`'s identity; the root or a missing
    /// node clears the selection.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, node: &Node) {
        self.selection = match self.model.find(node.identifier()) {
            Some(found) if !found.is_root() && found.kind() == node.kind() => {
                Selection::Selected(found)
            }
            _ => Selection::NoSelection,
        };
        debug!(selection = ?self.selection, "select");
        self.seed_edit_buffer();
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::NoSelection;
        self.edit_buffer = None;
    }

    /// Requests `id` to be selected by the next [`reload`](Self::reload).
    pub fn queue_selection(&mut self, id: Identifier) {
        self.queued_selection = Some(id);
    }

    pub fn queued_selection(&self) -> Option<Identifier> {
        self.queued_selection
    }

    // ------------------------------------------------------------
    // Edit buffer
    // ------------------------------------------------------------

    fn seed_edit_buffer(&mut self) {
        self.edit_buffer = self.selection.node().and_then(|selected| {
            let pristine = if self.settings.edit_from_original {
                find_in(&self.original, selected.identifier())
            } else {
                None
            };
            EditBuffer::from_node(pristine.as_ref().unwrap_or(selected))
        });
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.edit_buffer.as_ref()
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        self.edit_buffer.as_mut()
    }

    /// Writes the edit buffer into the live object it was taken from.
    #[instrument(level = "debug", skip(self))]
    pub fn commit_edit(&mut self) -> ApplicationResult<()> {
        let Some(buffer) = &self.edit_buffer else {
            return Ok(());
        };
        let id = buffer.identifier();
        let node = self.model.find(id).ok_or(TreeError::NodeNotInTree(id))?;
        if !buffer.apply_to(&node) {
            return Err(TreeError::NodeNotInTree(id).into());
        }
        self.model.node_changed(&node)?;
        Ok(())
    }

    /// Discards buffer changes by re-seeding it.
    pub fn revert_edit(&mut self) {
        self.seed_edit_buffer();
    }

    // ------------------------------------------------------------
    // Original / current
    // ------------------------------------------------------------

    pub fn is_modified(&self) -> bool {
        !self.current().borrow().same_content(&self.original.borrow())
    }

    /// Replaces the live groups with copies of the original ones and reloads.
    #[instrument(level = "debug", skip(self))]
    pub fn reset_to_original(&mut self) {
        let groups = self.original.borrow().deep_copy(true).groups;
        self.current().borrow_mut().groups = groups;
        self.reload();
    }

    /// Makes the live state the new reset target.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_to_original(&mut self) {
        let groups = self.current().borrow().deep_copy(true).groups;
        self.original.borrow_mut().groups = groups;
    }

    // ------------------------------------------------------------
    // Expansion
    // ------------------------------------------------------------

    /// False for nodes outside the tree.
    pub fn is_expanded(&self, node: &Node) -> bool {
        if !self.model.contains(node) {
            return false;
        }
        match node.kind() {
            NodeKind::Root => true,
            NodeKind::Group => !self.collapsed.contains(&node.identifier()),
            NodeKind::Item => false,
        }
    }

    pub fn is_collapsed(&self, node: &Node) -> bool {
        node.is_group() && self.collapsed.contains(&node.identifier())
    }

    /// Expands or collapses a group; the root is always expanded.
    pub fn set_expanded(&mut self, node: &Node, expanded: bool) -> ApplicationResult<()> {
        if !self.model.contains(node) {
            return Err(TreeError::NodeNotInTree(node.identifier()).into());
        }
        match node.kind() {
            NodeKind::Root => {}
            NodeKind::Group if expanded => {
                self.collapsed.remove(&node.identifier());
            }
            NodeKind::Group => {
                self.collapsed.insert(node.identifier());
            }
            NodeKind::Item => return Err(TreeError::InfertileParent(node.identifier()).into()),
        }
        Ok(())
    }

    pub fn expand(&mut self, node: &Node) -> ApplicationResult<()> {
        self.set_expanded(node, true)
    }

    pub fn collapse(&mut self, node: &Node) -> ApplicationResult<()> {
        self.set_expanded(node, false)
    }

    /// Marks every group expanded; selection is untouched.
    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all(&mut self) {
        self.collapsed = self
            .model
            .root()
            .children()
            .unwrap_or_default()
            .iter()
            .map(Node::identifier)
            .collect();
    }

    /// Rows a view shows: items of collapsed groups are hidden.
    pub fn visible_rows(&self) -> Vec<Node> {
        let mut rows = Vec::new();
        for group in self.model.root().children().unwrap_or_default() {
            let expanded = self.is_expanded(&group);
            rows.push(group.clone());
            if expanded {
                rows.extend(group.children().unwrap_or_default());
            }
        }
        rows
    }

    // ------------------------------------------------------------
    // Edit verbs
    // ------------------------------------------------------------

    /// Inserts a new group or item relative to the current selection.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, node: Node) -> ApplicationResult<()> {
        let root = self.model.root();
        let selected = self.selection.node().cloned();

        match (node.kind(), selected) {
            (NodeKind::Root, _) => {
                return Err(TreeError::WrongChildType {
                    parent: NodeKind::Root,
                    child: NodeKind::Root,
                }
                .into())
            }
            (NodeKind::Group, None) => {
                self.model.insert_node(&root, node.clone(), None)?;
            }
            (NodeKind::Item, None) => {
                return Err(TreeError::WrongChildType {
                    parent: NodeKind::Root,
                    child: NodeKind::Item,
                }
                .into())
            }
            (NodeKind::Group, Some(selected)) => {
                let anchor = self.owning_group(&selected)?;
                self.model.insert_node_after(&root, &anchor, node.clone())?;
            }
            (NodeKind::Item, Some(selected)) if selected.is_group() => {
                self.model.insert_node(&selected, node.clone(), None)?;
            }
            (NodeKind::Item, Some(selected)) => {
                let parent = self.owning_group(&selected)?;
                self.model.insert_node_after(&parent, &selected, node.clone())?;
            }
        }

        if node.is_group() {
            if self.settings.expand_new_groups {
                self.collapsed.remove(&node.identifier());
            } else {
                self.collapsed.insert(node.identifier());
            }
        }
        if let Some(parent) = self.model.parent_of(&node)? {
            if parent.is_group() && parent.child_count() == 1 {
                self.collapsed.remove(&parent.identifier());
            }
        }
        self.select(&node);
        Ok(())
    }

    /// The group itself, or the parent group of an item.
    fn owning_group(&self, node: &Node) -> TreeResult<Node> {
        if node.is_group() {
            return Ok(node.clone());
        }
        self.model
            .parent_of(node)?
            .filter(Node::is_group)
            .ok_or(TreeError::NodeNotInTree(node.identifier()))
    }

    /// Removes `node` and selects its following sibling, else its preceding
    /// sibling, else its parent group, else nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, node: &Node) -> ApplicationResult<()> {
        let (parent, index) = self.model.remove_node(node)?;
        if node.is_group() {
            self.collapsed.remove(&node.identifier());
        }

        let remaining = parent.child_count();
        let next = if index < remaining {
            Some(self.model.child_at(&parent, index)?)
        } else if index > 0 {
            Some(self.model.child_at(&parent, index - 1)?)
        } else if parent.is_group() {
            Some(parent)
        } else {
            None
        };

        match next {
            Some(next) => self.select(&next),
            None => self.clear_selection(),
        }
        Ok(())
    }

    /// Rows `exchange_rows` needs to move `node` by one position.
    ///
    /// Items pair with the adjacent row; groups pair with the adjacent group.
    fn exchange_partner(&self, node: &Node, move_down: bool) -> TreeResult<(usize, usize)> {
        let row = self.model.row_of(node)?;
        let row_count = self.model.row_count();
        // Attempted partner row; an upward miss from row 0 reads as -1
        let target = if move_down {
            row + 1 + node.child_count()
        } else {
            row.wrapping_sub(1)
        };
        let refuse = || TreeError::CannotSwapRows {
            row_a: row,
            row_b: target,
            row_count,
        };

        if node.is_group() {
            let root = self.model.root();
            let index = self
                .model
                .index_of_child(&root, node)?
                .ok_or(TreeError::NodeNotInTree(node.identifier()))?;
            let sibling = if move_down {
                index + 1
            } else {
                index.checked_sub(1).ok_or_else(refuse)?
            };
            let sibling = self.model.child_at(&root, sibling).map_err(|_| refuse())?;
            Ok((row, self.model.row_of(&sibling)?))
        } else if move_down {
            Ok((row, row + 1))
        } else {
            Ok((row, row.checked_sub(1).ok_or_else(refuse)?))
        }
    }

    pub fn can_move_by_one_position(&self, node: &Node, move_down: bool) -> bool {
        self.exchange_partner(node, move_down)
            .map(|(a, b)| self.model.can_exchange_rows(a, b))
            .unwrap_or(false)
    }

    pub fn can_exchange_rows(&self, row_a: usize, row_b: usize) -> bool {
        self.model.can_exchange_rows(row_a, row_b)
    }

    /// Moves `node` one position up or down, crossing into the neighbouring
    /// group at the edges of its own group.
    #[instrument(level = "debug", skip(self))]
    pub fn move_by_one_position(&mut self, node: &Node, move_down: bool) -> ApplicationResult<()> {
        let (row, partner) = self.exchange_partner(node, move_down)?;
        let old_parent = self.model.parent_of(node)?;

        self.model.exchange_rows(row, partner)?;

        let new_parent = self.model.parent_of(node)?;
        if new_parent != old_parent {
            if let Some(parent) = new_parent.filter(Node::is_group) {
                self.collapsed.remove(&parent.identifier());
            }
        }
        self.select(node);
        Ok(())
    }

    // ------------------------------------------------------------
    // Reload
    // ------------------------------------------------------------

    /// Re-derives the view from a possibly externally mutated current collection.
    ///
    /// Collapse state and selection are carried over by identifier. A queued
    /// selection wins over the previous one; without either, the first group
    /// (or nothing) is selected.
    #[instrument(level = "debug", skip(self))]
    pub fn reload(&mut self) {
        let previous = self.selection.identifier();
        let collapsed = std::mem::take(&mut self.collapsed);

        self.model.fire_tree_structure_changed();

        let model = &self.model;
        self.collapsed = collapsed
            .into_iter()
            .filter(|id| model.find(*id).is_some_and(|n| n.is_group()))
            .collect();

        let restored = self
            .queued_selection
            .take()
            .into_iter()
            .chain(previous)
            .find_map(|id| self.model.find(id).filter(|n| !n.is_root()));
        let target = restored.or_else(|| {
            if self.settings.fallback_to_first_group {
                self.model.child_at(&self.model.root(), 0).ok()
            } else {
                None
            }
        });
        debug!(?previous, ?target, collapsed = self.collapsed.len(), "reload");

        match target {
            Some(node) => self.select(&node),
            None => self.clear_selection(),
        }
    }
}

/// Looks up `id` below `collection`, which need not back a model.
fn find_in(collection: &CollectionRef, id: Identifier) -> Option<Node> {
    Node::Root(collection.clone())
        .descendants()
        .find(|n| n.identifier() == id)
}
