//! Structural change notifications emitted by the tree model.

use crate::domain::node::Node;

/// One structural change, scoped to a parent node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeModelEvent {
    /// Children at `indices` changed in place (contents or order).
    NodesChanged {
        parent: Node,
        indices: Vec<usize>,
        children: Vec<Node>,
    },
    /// `children` now live at `indices` of `parent`.
    NodesInserted {
        parent: Node,
        indices: Vec<usize>,
        children: Vec<Node>,
    },
    /// `children` were at `indices` of `parent` before removal.
    NodesRemoved {
        parent: Node,
        indices: Vec<usize>,
        children: Vec<Node>,
    },
    /// Everything below `node` must be re-derived; `node` is the root for a whole-tree reload.
    StructureChanged { node: Node },
}

impl TreeModelEvent {
    pub fn parent(&self) -> &Node {
        match self {
            TreeModelEvent::NodesChanged { parent, .. }
            | TreeModelEvent::NodesInserted { parent, .. }
            | TreeModelEvent::NodesRemoved { parent, .. } => parent,
            TreeModelEvent::StructureChanged { node } => node,
        }
    }
}

/// Receives tree model events synchronously.
///
/// Listeners only see the event; they cannot reach the model that fires it.
pub trait TreeModelListener {
    fn on_event(&mut self, event: &TreeModelEvent);
}

impl<F> TreeModelListener for F
where
    F: FnMut(&TreeModelEvent),
{
    fn on_event(&mut self, event: &TreeModelEvent) {
        self(event)
    }
}

/// Handle returned by `TreeModel::add_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
