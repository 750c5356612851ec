//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Inspect and edit two-level group/item collections
#[derive(Parser, Debug)]
#[command(name = "grouptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a collection as tree or numbered rows
    Show {
        /// Collection file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Print numbered rows instead of a tree
        #[arg(long)]
        rows: bool,
        /// Hide the items of the named group (repeatable, rows view)
        #[arg(long = "collapse", value_name = "GROUP")]
        collapsed: Vec<String>,
    },

    /// Add a group after the group at (or owning) a row, or at the end
    AddGroup {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Group name
        name: String,
        /// Row to insert after
        #[arg(long)]
        after_row: Option<usize>,
        /// Save the result back to the file
        #[arg(short, long)]
        write: bool,
    },

    /// Add an item into the group at a row, or after the item at a row
    AddItem {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item name
        name: String,
        /// Row of the group or item to add relative to
        #[arg(long)]
        row: usize,
        #[arg(short, long)]
        write: bool,
    },

    /// Remove the group or item at a row
    Remove {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long)]
        row: usize,
        #[arg(short, long)]
        write: bool,
    },

    /// Move the group or item at a row by one position
    Move {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long)]
        row: usize,
        /// Move down instead of up
        #[arg(long)]
        down: bool,
        #[arg(short, long)]
        write: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a commented config template
    Template,
}
