//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::Identifier;
use crate::domain::node::NodeKind;

/// Structural contract violations of the tree model.
///
/// Every variant is raised before any mutation takes place; callers are
/// expected to consult the matching `can_*` predicate first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node not in tree: {0}")]
    NodeNotInTree(Identifier),

    #[error("{parent:?} cannot have a {child:?} child")]
    WrongChildType { parent: NodeKind, child: NodeKind },

    #[error("node {after} is not a child of {parent}")]
    WrongParent {
        parent: Identifier,
        after: Identifier,
    },

    #[error("{0} cannot have children")]
    InfertileParent(Identifier),

    #[error("the root node cannot be removed")]
    CannotRemoveRoot,

    #[error("items cannot be inserted directly below the root")]
    CannotInsertAtRootAsLeaf,

    #[error("cannot swap rows {row_a} and {row_b} ({row_count} rows)")]
    CannotSwapRows {
        row_a: usize,
        row_b: usize,
        row_count: usize,
    },

    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("node already in tree: {0}")]
    DuplicateNode(Identifier),

    #[error("the root node has no row")]
    RootHasNoRow,
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
