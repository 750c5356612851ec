//! Infrastructure layer: I/O implementations
//!
//! This layer implements the I/O boundary traits.

pub mod error;
pub mod store;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use store::TomlCollectionStore;
pub use traits::CollectionStore;
