//! Domain entities: the collection, its groups and their items

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared handle to the root collection.
pub type CollectionRef = Rc<RefCell<Collection>>;
/// Shared handle to a group.
pub type GroupRef = Rc<RefCell<Group>>;
/// Shared handle to an item.
pub type ItemRef = Rc<RefCell<Item>>;

/// Stable identity of a collection, group or item.
///
/// Survives `deep_copy(true)`; `deep_copy(false)` mints a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Uuid);

impl Identifier {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leaf entity of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: Identifier,
    pub name: String,
    pub enabled: bool,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Identifier::new(), name)
    }

    pub fn with_id(id: Identifier, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
        }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn deep_copy(&self, retain_identity: bool) -> Self {
        Self {
            id: if retain_identity { self.id } else { Identifier::new() },
            name: self.name.clone(),
            enabled: self.enabled,
        }
    }

    pub fn into_ref(self) -> ItemRef {
        Rc::new(RefCell::new(self))
    }
}

/// First-level container owning an ordered sequence of items.
///
/// `Clone` is a retained-identity deep copy; item handles are never shared.
#[derive(Debug)]
pub struct Group {
    id: Identifier,
    pub name: String,
    pub items: Vec<ItemRef>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Identifier::new(), name)
    }

    pub fn with_id(id: Identifier, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Builder-style helper appending fresh items with the given names.
    pub fn with_items<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items
            .extend(names.into_iter().map(|n| Item::new(n).into_ref()));
        self
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    /// Copies the group and all of its items into new handles.
    ///
    /// Without retained identity every item gets a fresh identifier as well.
    pub fn deep_copy(&self, retain_identity: bool) -> Self {
        Self {
            id: if retain_identity { self.id } else { Identifier::new() },
            name: self.name.clone(),
            items: self
                .items
                .iter()
                .map(|item| item.borrow().deep_copy(retain_identity).into_ref())
                .collect(),
        }
    }

    pub fn into_ref(self) -> GroupRef {
        Rc::new(RefCell::new(self))
    }
}

impl Clone for Group {
    fn clone(&self) -> Self {
        self.deep_copy(true)
    }
}

/// Root of the two-level hierarchy.
///
/// `Clone` is a retained-identity deep copy; group and item handles are never shared.
#[derive(Debug, Default)]
pub struct Collection {
    id: Identifier,
    pub groups: Vec<GroupRef>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(groups: Vec<Group>) -> Self {
        Self {
            id: Identifier::new(),
            groups: groups.into_iter().map(Group::into_ref).collect(),
        }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn deep_copy(&self, retain_identity: bool) -> Self {
        Self {
            id: if retain_identity { self.id } else { Identifier::new() },
            groups: self
                .groups
                .iter()
                .map(|group| group.borrow().deep_copy(retain_identity).into_ref())
                .collect(),
        }
    }

    /// Structural equality: same identifiers in the same order with equal fields.
    pub fn same_content(&self, other: &Collection) -> bool {
        self.groups.len() == other.groups.len()
            && self.groups.iter().zip(&other.groups).all(|(a, b)| {
                let (a, b) = (a.borrow(), b.borrow());
                a.id == b.id
                    && a.name == b.name
                    && a.items.len() == b.items.len()
                    && a.items
                        .iter()
                        .zip(&b.items)
                        .all(|(x, y)| *x.borrow() == *y.borrow())
            })
    }

    /// True when any group or item handle of `self` is also held by `other`.
    pub fn shares_objects_with(&self, other: &Collection) -> bool {
        let groups: HashSet<*const RefCell<Group>> =
            self.groups.iter().map(Rc::as_ptr).collect();
        let items: HashSet<*const RefCell<Item>> = self
            .groups
            .iter()
            .flat_map(|g| g.borrow().items.iter().map(Rc::as_ptr).collect::<Vec<_>>())
            .collect();

        other.groups.iter().any(|g| {
            groups.contains(&Rc::as_ptr(g))
                || g.borrow().items.iter().any(|i| items.contains(&Rc::as_ptr(i)))
        })
    }

    pub fn into_ref(self) -> CollectionRef {
        Rc::new(RefCell::new(self))
    }
}

impl Clone for Collection {
    fn clone(&self) -> Self {
        self.deep_copy(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_group_when_deep_copy_retaining_identity_then_ids_match_and_handles_differ() {
        let group = Group::new("dev").with_items(["a", "b"]);
        let copy = group.deep_copy(true);

        assert_eq!(copy.id(), group.id());
        assert_eq!(copy.items[0].borrow().id(), group.items[0].borrow().id());
        assert!(!Rc::ptr_eq(&copy.items[0], &group.items[0]));
    }

    #[test]
    fn given_group_when_deep_copy_without_identity_then_all_ids_are_fresh() {
        let group = Group::new("dev").with_items(["a"]);
        let copy = group.deep_copy(false);

        assert_ne!(copy.id(), group.id());
        assert_ne!(copy.items[0].borrow().id(), group.items[0].borrow().id());
        assert_eq!(copy.items[0].borrow().name, "a");
    }

    #[test]
    fn given_retained_copy_when_item_renamed_then_same_content_is_false() {
        let collection = Collection::with_groups(vec![Group::new("g").with_items(["a"])]);
        let copy = collection.deep_copy(true);
        assert!(collection.same_content(&copy));

        copy.groups[0].borrow().items[0].borrow_mut().name = "renamed".into();
        assert!(!collection.same_content(&copy));
    }

    #[test]
    fn given_collection_when_cloned_then_no_handles_shared() {
        let collection = Collection::with_groups(vec![Group::new("g").with_items(["a"])]);

        let copy = collection.clone();

        assert_eq!(copy.id(), collection.id());
        assert!(copy.same_content(&collection));
        assert!(!copy.shares_objects_with(&collection));
    }

    #[test]
    fn given_collections_sharing_an_item_when_checked_then_shared() {
        let collection = Collection::with_groups(vec![Group::new("g").with_items(["a"])]);
        let mut other = Group::new("h");
        other
            .items
            .push(Rc::clone(&collection.groups[0].borrow().items[0]));
        let other = Collection::with_groups(vec![other]);

        assert!(other.shares_objects_with(&collection));
        assert!(collection.shares_objects_with(&other));
    }
}
