//! Identity-bearing tree node wrapping the root, a group or an item.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::instrument;

use crate::domain::entities::{CollectionRef, GroupRef, Identifier, ItemRef};
use crate::domain::error::{TreeError, TreeResult};

/// Variant tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Group,
    Item,
}

/// A node of the two-level tree.
///
/// Equality and hashing look only at the wrapped object's identifier, so a
/// node wrapping a retained-identity copy equals the node wrapping the
/// original object.
#[derive(Clone)]
pub enum Node {
    Root(CollectionRef),
    Group(GroupRef),
    Item(ItemRef),
}

impl Node {
    pub fn identifier(&self) -> Identifier {
        match self {
            Node::Root(c) => c.borrow().id(),
            Node::Group(g) => g.borrow().id(),
            Node::Item(i) => i.borrow().id(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Group(_) => NodeKind::Group,
            Node::Item(_) => NodeKind::Item,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Node::Root(_) => "<root>".to_string(),
            Node::Group(g) => g.borrow().name.clone(),
            Node::Item(i) => i.borrow().name.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Node::Root(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn is_item(&self) -> bool {
        matches!(self, Node::Item(_))
    }

    pub fn can_have_children(&self) -> bool {
        !self.is_item()
    }

    /// True only for (root, group) and (group, item) pairings.
    pub fn can_have_child(&self, candidate: &Node) -> bool {
        matches!(
            (self, candidate),
            (Node::Root(_), Node::Group(_)) | (Node::Group(_), Node::Item(_))
        )
    }

    /// Children in the wrapped object's native order.
    pub fn children(&self) -> TreeResult<Vec<Node>> {
        match self {
            Node::Root(c) => Ok(c.borrow().groups.iter().cloned().map(Node::Group).collect()),
            Node::Group(g) => Ok(g.borrow().items.iter().cloned().map(Node::Item).collect()),
            Node::Item(_) => Err(TreeError::InfertileParent(self.identifier())),
        }
    }

    pub fn child_count(&self) -> usize {
        match self {
            Node::Root(c) => c.borrow().groups.len(),
            Node::Group(g) => g.borrow().items.len(),
            Node::Item(_) => 0,
        }
    }

    /// Replaces the wrapped child sequence with the objects behind `children`.
    ///
    /// All children are validated before anything is written.
    #[instrument(level = "trace", skip(self, children))]
    pub fn set_children(&self, children: Vec<Node>) -> TreeResult<()> {
        if !self.can_have_children() {
            return Err(TreeError::InfertileParent(self.identifier()));
        }
        if let Some(bad) = children.iter().find(|c| !self.can_have_child(c)) {
            return Err(TreeError::WrongChildType {
                parent: self.kind(),
                child: bad.kind(),
            });
        }
        match self {
            Node::Root(c) => {
                c.borrow_mut().groups = children
                    .into_iter()
                    .filter_map(|n| match n {
                        Node::Group(g) => Some(g),
                        _ => None,
                    })
                    .collect();
            }
            Node::Group(g) => {
                g.borrow_mut().items = children
                    .into_iter()
                    .filter_map(|n| match n {
                        Node::Item(i) => Some(i),
                        _ => None,
                    })
                    .collect();
            }
            Node::Item(_) => return Err(TreeError::InfertileParent(self.identifier())),
        }
        Ok(())
    }

    /// Depth-first pre-order traversal of all transitive children.
    ///
    /// Recomputed on every call; the node itself is not yielded.
    pub fn descendants(&self) -> Descendants {
        Descendants::new(self)
    }

    /// True when both nodes wrap the very same object (not just the same identity).
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Root(a), Node::Root(b)) => Rc::ptr_eq(a, b),
            (Node::Group(a), Node::Group(b)) => Rc::ptr_eq(a, b),
            (Node::Item(a), Node::Item(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind() {
            NodeKind::Root => "Root",
            NodeKind::Group => "Group",
            NodeKind::Item => "Item",
        };
        f.debug_tuple(tag)
            .field(&self.name())
            .field(&self.identifier())
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<GroupRef> for Node {
    fn from(group: GroupRef) -> Self {
        Node::Group(group)
    }
}

impl From<ItemRef> for Node {
    fn from(item: ItemRef) -> Self {
        Node::Item(item)
    }
}

pub struct Descendants {
    stack: Vec<Node>,
}

impl Descendants {
    fn new(start: &Node) -> Self {
        let mut stack = start.children().unwrap_or_default();
        // Reverse so the first child is popped first
        stack.reverse();
        Self { stack }
    }
}

impl Iterator for Descendants {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Ok(children) = current.children() {
            self.stack.extend(children.into_iter().rev());
        }
        Some(current)
    }
}
