//! Selection state and the edit buffer seeded from it.

use crate::domain::{Group, Identifier, Item, Node};

/// Selection state machine of the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(Node),
}

impl Selection {
    pub fn node(&self) -> Option<&Node> {
        match self {
            Selection::NoSelection => None,
            Selection::Selected(node) => Some(node),
        }
    }

    pub fn identifier(&self) -> Option<Identifier> {
        self.node().map(Node::identifier)
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }
}

/// Detached, retained-identity copy of the selected object for editing.
///
/// Changes stay in the buffer until committed to the live collection.
#[derive(Debug, Clone)]
pub enum EditBuffer {
    Group(Group),
    Item(Item),
}

impl EditBuffer {
    /// Copies the object behind `node`; `None` for the root.
    pub fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Root(_) => None,
            Node::Group(g) => Some(EditBuffer::Group(g.borrow().deep_copy(true))),
            Node::Item(i) => Some(EditBuffer::Item(i.borrow().deep_copy(true))),
        }
    }

    pub fn identifier(&self) -> Identifier {
        match self {
            EditBuffer::Group(g) => g.id(),
            EditBuffer::Item(i) => i.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EditBuffer::Group(g) => &g.name,
            EditBuffer::Item(i) => &i.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            EditBuffer::Group(g) => g.name = name.into(),
            EditBuffer::Item(i) => i.name = name.into(),
        }
    }

    /// Writes the buffer's own fields into `node`; children are left alone.
    ///
    /// Returns false when `node` is not the object this buffer was taken from.
    pub fn apply_to(&self, node: &Node) -> bool {
        if node.identifier() != self.identifier() {
            return false;
        }
        match (self, node) {
            (EditBuffer::Group(buffer), Node::Group(target)) => {
                target.borrow_mut().name = buffer.name.clone();
                true
            }
            (EditBuffer::Item(buffer), Node::Item(target)) => {
                let mut target = target.borrow_mut();
                target.name = buffer.name.clone();
                target.enabled = buffer.enabled;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_item_buffer_when_applied_then_fields_copied_to_target() {
        let node = Node::Item(Item::new("a").into_ref());
        let mut buffer = EditBuffer::from_node(&node).unwrap();
        buffer.set_name("renamed");
        if let EditBuffer::Item(item) = &mut buffer {
            item.enabled = false;
        }

        assert!(buffer.apply_to(&node));

        assert_eq!(node.name(), "renamed");
        let Node::Item(item) = &node else { unreachable!() };
        assert!(!item.borrow().enabled);
    }

    #[test]
    fn given_buffer_when_applied_to_other_node_then_refused() {
        let node = Node::Group(Group::new("g").into_ref());
        let other = Node::Group(Group::new("h").into_ref());
        let buffer = EditBuffer::from_node(&node).unwrap();

        assert!(!buffer.apply_to(&other));
        assert_eq!(other.name(), "h");
    }
}
