//! Application layer: the tree controller and its view state
//!
//! This layer drives the domain tree model on behalf of commands and views.

pub mod controller;
pub mod error;
pub mod selection;

pub use controller::TreeController;
pub use error::{ApplicationError, ApplicationResult};
pub use selection::{EditBuffer, Selection};
