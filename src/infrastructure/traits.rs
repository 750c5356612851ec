//! I/O boundary traits for testability
//!
//! The tree core never performs I/O; collections enter and leave it through
//! these traits.

use std::path::Path;

use crate::domain::Collection;
use crate::infrastructure::InfraResult;

/// Persistence of a collection, e.g. as a file.
pub trait CollectionStore {
    /// Read a collection; entities without a stored identifier get a fresh one.
    fn load(&self, path: &Path) -> InfraResult<Collection>;

    /// Write a collection including all identifiers.
    fn save(&self, path: &Path, collection: &Collection) -> InfraResult<()>;
}
