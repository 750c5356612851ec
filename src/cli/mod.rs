//! CLI layer: argument parsing, command dispatch and output formatting

pub mod args;
pub mod commands;
pub mod error;
pub mod output;

pub use error::{CliError, CliResult};
