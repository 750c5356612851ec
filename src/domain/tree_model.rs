//! Row-indexed tree model over a two-level collection.
//!
//! The model is the only component that mutates the collection structurally
//! and the only one that emits [`TreeModelEvent`]s. Rows number a depth-first
//! pre-order flattening of the tree, root excluded:
//!
//! ```text
//! <root>
//! ├── G0      row 0
//! │   ├── a   row 1
//! │   └── b   row 2
//! ├── G1      row 3
//! └── G2      row 4
//!     └── c   row 5
//! ```

use std::iter;

use tracing::{debug, instrument, trace};

use crate::domain::entities::{CollectionRef, GroupRef, Identifier};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::events::{ListenerId, TreeModelEvent, TreeModelListener};
use crate::domain::node::{Node, NodeKind};

/// Location of an object inside the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Root,
    Group(usize),
    Item { group: usize, index: usize },
}

/// Resolved form of a legal `exchange_rows` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exchange {
    /// Swap two groups of the root.
    Groups { a: usize, b: usize },
    /// Swap two items of the same group.
    Siblings { group: usize, a: usize, b: usize },
    /// First item of `group` becomes the last item of `group - 1`.
    Demote { group: usize },
    /// Last item of `group` becomes the first item of `group + 1`.
    Promote { group: usize },
}

pub struct TreeModel {
    root: CollectionRef,
    listeners: Vec<(ListenerId, Box<dyn TreeModelListener>)>,
    next_listener_id: u64,
}

impl TreeModel {
    pub fn new(root: CollectionRef) -> Self {
        Self {
            root,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn root(&self) -> Node {
        Node::Root(self.root.clone())
    }

    pub fn collection(&self) -> &CollectionRef {
        &self.root
    }

    // ------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------

    pub fn add_listener(&mut self, listener: impl TreeModelListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: TreeModelEvent) {
        trace!(?event, listeners = self.listeners.len(), "emit");
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_event(&event);
        }
    }

    /// Tells every listener to re-derive the whole tree.
    pub fn fire_tree_structure_changed(&mut self) {
        let root = self.root();
        self.emit(TreeModelEvent::StructureChanged { node: root });
    }

    /// Reports an in-place change of `node`'s own contents.
    #[instrument(level = "trace", skip(self))]
    pub fn node_changed(&mut self, node: &Node) -> TreeResult<()> {
        let (node, position) = self.resolve(node)?;
        let event = match self.parent_at(position) {
            Some((parent, index)) => TreeModelEvent::NodesChanged {
                parent,
                indices: vec![index],
                children: vec![node],
            },
            None => TreeModelEvent::NodesChanged {
                parent: node,
                indices: Vec::new(),
                children: Vec::new(),
            },
        };
        self.emit(event);
        Ok(())
    }

    // ------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------

    fn position_of(&self, id: Identifier, kind: NodeKind) -> Option<Position> {
        let collection = self.root.borrow();
        match kind {
            NodeKind::Root => (collection.id() == id).then_some(Position::Root),
            NodeKind::Group => collection
                .groups
                .iter()
                .position(|g| g.borrow().id() == id)
                .map(Position::Group),
            NodeKind::Item => collection.groups.iter().enumerate().find_map(|(group, g)| {
                g.borrow()
                    .items
                    .iter()
                    .position(|i| i.borrow().id() == id)
                    .map(|index| Position::Item { group, index })
            }),
        }
    }

    fn node_at(&self, position: Position) -> Option<Node> {
        let collection = self.root.borrow();
        match position {
            Position::Root => Some(self.root()),
            Position::Group(index) => collection.groups.get(index).cloned().map(Node::Group),
            Position::Item { group, index } => collection
                .groups
                .get(group)
                .and_then(|g| g.borrow().items.get(index).cloned())
                .map(Node::Item),
        }
    }

    /// Parent node and child index for a position, `None` for the root.
    fn parent_at(&self, position: Position) -> Option<(Node, usize)> {
        match position {
            Position::Root => None,
            Position::Group(index) => Some((self.root(), index)),
            Position::Item { group, index } => self
                .node_at(Position::Group(group))
                .map(|parent| (parent, index)),
        }
    }

    /// Maps a caller's node to the in-tree node with the same identity.
    fn resolve(&self, node: &Node) -> TreeResult<(Node, Position)> {
        let id = node.identifier();
        self.position_of(id, node.kind())
            .and_then(|position| self.node_at(position).map(|n| (n, position)))
            .ok_or(TreeError::NodeNotInTree(id))
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.position_of(node.identifier(), node.kind()).is_some()
    }

    /// Finds the in-tree node carrying `id`, whatever its kind.
    pub fn find(&self, id: Identifier) -> Option<Node> {
        [NodeKind::Root, NodeKind::Group, NodeKind::Item]
            .into_iter()
            .find_map(|kind| self.position_of(id, kind))
            .and_then(|position| self.node_at(position))
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    #[instrument(level = "trace", skip(self))]
    pub fn is_leaf(&self, node: &Node) -> TreeResult<bool> {
        let (node, _) = self.resolve(node)?;
        Ok(!node.can_have_children())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn child_count(&self, parent: &Node) -> TreeResult<usize> {
        let (parent, _) = self.resolve(parent)?;
        Ok(parent.child_count())
    }

    #[instrument(level = "trace", skip(self))]
    pub fn child_at(&self, parent: &Node, index: usize) -> TreeResult<Node> {
        let (parent, _) = self.resolve(parent)?;
        let children = parent.children()?;
        let len = children.len();
        children
            .into_iter()
            .nth(index)
            .ok_or(TreeError::IndexOutOfBounds { index, len })
    }

    /// Index of `child` below `parent`, matched by identifier.
    #[instrument(level = "trace", skip(self))]
    pub fn index_of_child(&self, parent: &Node, child: &Node) -> TreeResult<Option<usize>> {
        let (parent, _) = self.resolve(parent)?;
        if !parent.can_have_children() {
            return Ok(None);
        }
        Ok(parent.children()?.iter().position(|c| c == child))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn parent_of(&self, node: &Node) -> TreeResult<Option<Node>> {
        let (_, position) = self.resolve(node)?;
        Ok(self.parent_at(position).map(|(parent, _)| parent))
    }

    /// Nodes from the root down to `node`, both included.
    #[instrument(level = "trace", skip(self))]
    pub fn path_to_root(&self, node: &Node) -> TreeResult<Vec<Node>> {
        let (node, position) = self.resolve(node)?;
        let mut path = vec![node];
        let mut current = position;
        while let Some((parent, _)) = self.parent_at(current) {
            current = match parent.kind() {
                NodeKind::Root => Position::Root,
                _ => {
                    let (_, p) = self.resolve(&parent)?;
                    p
                }
            };
            path.push(parent);
        }
        path.reverse();
        Ok(path)
    }

    pub fn row_count(&self) -> usize {
        let collection = self.root.borrow();
        collection.groups.len()
            + collection
                .groups
                .iter()
                .map(|g| g.borrow().items.len())
                .sum::<usize>()
    }

    /// All rows in display order.
    pub fn rows(&self) -> Vec<Node> {
        self.root().descendants().collect()
    }

    pub fn node_at_row(&self, row: usize) -> Option<Node> {
        self.position_at_row(row).and_then(|p| self.node_at(p))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn row_of(&self, node: &Node) -> TreeResult<usize> {
        let (_, position) = self.resolve(node)?;
        let group_row = |group: usize| -> usize {
            self.root.borrow().groups[..group]
                .iter()
                .map(|g| 1 + g.borrow().items.len())
                .sum()
        };
        match position {
            Position::Root => Err(TreeError::RootHasNoRow),
            Position::Group(group) => Ok(group_row(group)),
            Position::Item { group, index } => Ok(group_row(group) + 1 + index),
        }
    }

    fn position_at_row(&self, row: usize) -> Option<Position> {
        let collection = self.root.borrow();
        let mut first = 0;
        for (group, g) in collection.groups.iter().enumerate() {
            let len = g.borrow().items.len();
            if row == first {
                return Some(Position::Group(group));
            }
            if row <= first + len {
                return Some(Position::Item {
                    group,
                    index: row - first - 1,
                });
            }
            first += 1 + len;
        }
        None
    }

    // ------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------

    fn check_insertable(&self, parent: &Node, child: &Node) -> TreeResult<()> {
        if !parent.can_have_children() {
            return Err(TreeError::InfertileParent(parent.identifier()));
        }
        if parent.is_root() && child.is_item() {
            return Err(TreeError::CannotInsertAtRootAsLeaf);
        }
        if !parent.can_have_child(child) {
            return Err(TreeError::WrongChildType {
                parent: parent.kind(),
                child: child.kind(),
            });
        }
        if let Some(duplicate) = iter::once(child.clone())
            .chain(child.descendants())
            .find(|n| self.find(n.identifier()).is_some())
        {
            return Err(TreeError::DuplicateNode(duplicate.identifier()));
        }
        Ok(())
    }

    /// Inserts `child` as the `index`-th child of `parent` (`None` appends).
    ///
    /// Returns the index the child ended up at.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_node(
        &mut self,
        parent: &Node,
        child: Node,
        index: Option<usize>,
    ) -> TreeResult<usize> {
        let (parent, _) = self.resolve(parent)?;
        self.check_insertable(&parent, &child)?;
        let len = parent.child_count();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }

        match (&parent, &child) {
            (Node::Root(collection), Node::Group(group)) => {
                collection.borrow_mut().groups.insert(index, group.clone());
            }
            (Node::Group(group), Node::Item(item)) => {
                group.borrow_mut().items.insert(index, item.clone());
            }
            (p, c) => {
                return Err(TreeError::WrongChildType {
                    parent: p.kind(),
                    child: c.kind(),
                })
            }
        }
        debug!("inserted {} at {} below {}", child, index, parent);

        // Views rebuild on the root's first child rather than inserting incrementally
        let event = if parent.is_root() && parent.child_count() == 1 {
            TreeModelEvent::StructureChanged { node: parent }
        } else {
            TreeModelEvent::NodesInserted {
                parent,
                indices: vec![index],
                children: vec![child],
            }
        };
        self.emit(event);
        Ok(index)
    }

    /// Inserts `child` directly after the existing child `after` of `parent`.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_node_after(
        &mut self,
        parent: &Node,
        after: &Node,
        child: Node,
    ) -> TreeResult<usize> {
        let (parent, _) = self.resolve(parent)?;
        if !parent.can_have_children() {
            return Err(TreeError::InfertileParent(parent.identifier()));
        }
        let index = self
            .index_of_child(&parent, after)?
            .ok_or(TreeError::WrongParent {
                parent: parent.identifier(),
                after: after.identifier(),
            })?;
        self.insert_node(&parent, child, Some(index + 1))
    }

    /// Detaches `node` from its parent.
    ///
    /// Returns the former parent and the index `node` occupied.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, node: &Node) -> TreeResult<(Node, usize)> {
        if node.is_root() {
            return Err(TreeError::CannotRemoveRoot);
        }
        let (node, position) = self.resolve(node)?;
        let (parent, index) = self
            .parent_at(position)
            .ok_or(TreeError::CannotRemoveRoot)?;

        match &parent {
            Node::Root(collection) => {
                collection.borrow_mut().groups.remove(index);
            }
            Node::Group(group) => {
                group.borrow_mut().items.remove(index);
            }
            Node::Item(_) => return Err(TreeError::InfertileParent(parent.identifier())),
        }
        debug!("removed {} from {} at {}", node, parent, index);

        self.emit(TreeModelEvent::NodesRemoved {
            parent: parent.clone(),
            indices: vec![index],
            children: vec![node],
        });
        Ok((parent, index))
    }

    fn plan_exchange(&self, row_a: usize, row_b: usize) -> TreeResult<Exchange> {
        let row_count = self.row_count();
        let refuse = || TreeError::CannotSwapRows {
            row_a,
            row_b,
            row_count,
        };
        if row_a == row_b {
            return Err(refuse());
        }
        let (lo, hi) = (row_a.min(row_b), row_a.max(row_b));
        let lo = self.position_at_row(lo).ok_or_else(refuse)?;
        let hi = self.position_at_row(hi).ok_or_else(refuse)?;

        match (lo, hi) {
            (Position::Group(a), Position::Group(b)) => Ok(Exchange::Groups { a, b }),
            (
                Position::Item { group, index: a },
                Position::Item {
                    group: other,
                    index: b,
                },
            ) if group == other => Ok(Exchange::Siblings { group, a, b }),
            // A group row directly above its own first item
            (Position::Group(g), Position::Item { group, index: 0 }) if g == group && g > 0 => {
                Ok(Exchange::Demote { group })
            }
            // The last item of a group directly above the next group
            (Position::Item { group, index }, Position::Group(next))
                if next == group + 1 && index + 1 == self.items_in(group) =>
            {
                Ok(Exchange::Promote { group })
            }
            _ => Err(refuse()),
        }
    }

    fn items_in(&self, group: usize) -> usize {
        self.root
            .borrow()
            .groups
            .get(group)
            .map(|g| g.borrow().items.len())
            .unwrap_or(0)
    }

    /// True when `exchange_rows(row_a, row_b)` would succeed.
    pub fn can_exchange_rows(&self, row_a: usize, row_b: usize) -> bool {
        self.plan_exchange(row_a, row_b).is_ok()
    }

    /// Swaps the tree positions of the nodes at two rows.
    ///
    /// Besides plain reordering of groups or of items within one group, an
    /// item swapped with its own group moves to the end of the previous group,
    /// and the last item of a group swapped with the next group moves to the
    /// front of that group.
    #[instrument(level = "debug", skip(self))]
    pub fn exchange_rows(&mut self, row_a: usize, row_b: usize) -> TreeResult<()> {
        let plan = self.plan_exchange(row_a, row_b)?;
        debug!(?plan, "exchange rows {} and {}", row_a, row_b);

        match plan {
            Exchange::Groups { a, b } => {
                let children = {
                    let mut collection = self.root.borrow_mut();
                    collection.groups.swap(a, b);
                    vec![
                        Node::Group(collection.groups[a].clone()),
                        Node::Group(collection.groups[b].clone()),
                    ]
                };
                let parent = self.root();
                self.emit(TreeModelEvent::NodesChanged {
                    parent,
                    indices: vec![a, b],
                    children,
                });
            }
            Exchange::Siblings { group, a, b } => {
                let parent = self.group_ref(group)?;
                let children = {
                    let mut g = parent.borrow_mut();
                    g.items.swap(a, b);
                    vec![Node::Item(g.items[a].clone()), Node::Item(g.items[b].clone())]
                };
                self.emit(TreeModelEvent::NodesChanged {
                    parent: Node::Group(parent),
                    indices: vec![a, b],
                    children,
                });
            }
            Exchange::Demote { group } => {
                let source = self.group_ref(group)?;
                let target = self.group_ref(group - 1)?;
                let item = source.borrow_mut().items.remove(0);
                let index = {
                    let mut t = target.borrow_mut();
                    t.items.push(item.clone());
                    t.items.len() - 1
                };
                self.emit_moved(Node::Group(source), 0, Node::Group(target), index, Node::Item(item));
            }
            Exchange::Promote { group } => {
                let source = self.group_ref(group)?;
                let target = self.group_ref(group + 1)?;
                let (item, from) = {
                    let mut s = source.borrow_mut();
                    let from = s.items.len() - 1;
                    (s.items.remove(from), from)
                };
                target.borrow_mut().items.insert(0, item.clone());
                self.emit_moved(Node::Group(source), from, Node::Group(target), 0, Node::Item(item));
            }
        }
        Ok(())
    }

    fn group_ref(&self, index: usize) -> TreeResult<GroupRef> {
        let collection = self.root.borrow();
        let len = collection.groups.len();
        collection
            .groups
            .get(index)
            .cloned()
            .ok_or(TreeError::IndexOutOfBounds { index, len })
    }

    fn emit_moved(&mut self, from: Node, from_index: usize, to: Node, to_index: usize, node: Node) {
        self.emit(TreeModelEvent::NodesRemoved {
            parent: from,
            indices: vec![from_index],
            children: vec![node.clone()],
        });
        self.emit(TreeModelEvent::NodesInserted {
            parent: to,
            indices: vec![to_index],
            children: vec![node],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Collection, Group};

    fn model() -> TreeModel {
        TreeModel::new(
            Collection::with_groups(vec![
                Group::new("G0").with_items(["a", "b"]),
                Group::new("G1"),
                Group::new("G2").with_items(["c"]),
            ])
            .into_ref(),
        )
    }

    #[test]
    fn given_rows_when_position_at_row_then_matches_flattening() {
        let m = model();
        assert_eq!(m.position_at_row(0), Some(Position::Group(0)));
        assert_eq!(m.position_at_row(2), Some(Position::Item { group: 0, index: 1 }));
        assert_eq!(m.position_at_row(3), Some(Position::Group(1)));
        assert_eq!(m.position_at_row(4), Some(Position::Group(2)));
        assert_eq!(m.position_at_row(5), Some(Position::Item { group: 2, index: 0 }));
        assert_eq!(m.position_at_row(6), None);
    }

    #[test]
    fn given_empty_group_between_when_planning_then_promote_requires_last_item() {
        let m = model();
        // a (row 1) is not last in G0, so it cannot jump to G1
        assert!(m.plan_exchange(1, 3).is_err());
        assert_eq!(m.plan_exchange(2, 3), Ok(Exchange::Promote { group: 0 }));
        // G0 has no predecessor
        assert!(m.plan_exchange(0, 1).is_err());
        assert_eq!(m.plan_exchange(5, 4), Ok(Exchange::Demote { group: 2 }));
    }
}
