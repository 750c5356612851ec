//! grouptree: a two-level group/item tree model with an identity-preserving
//! controller on top.
//!
//! Layers, innermost first:
//! - [`domain`]: entities, [`domain::Node`], [`domain::TreeModel`] and its events
//! - [`application`]: [`application::TreeController`] with selection and view state
//! - [`infrastructure`]: collection persistence
//! - [`cli`]: command line front end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use application::{ApplicationError, TreeController};
pub use config::Settings;
pub use domain::{Collection, Group, Identifier, Item, Node, TreeError, TreeModel};
