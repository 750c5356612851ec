//! Domain layer: entities, tree nodes and the tree model
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod events;
pub mod node;
pub mod tree_model;

pub use entities::{Collection, CollectionRef, Group, GroupRef, Identifier, Item, ItemRef};
pub use error::{TreeError, TreeResult};
pub use events::{ListenerId, TreeModelEvent, TreeModelListener};
pub use node::{Descendants, Node, NodeKind};
pub use tree_model::TreeModel;
