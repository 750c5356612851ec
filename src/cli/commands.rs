//! Command dispatch: load a collection, drive the controller, print the result

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::TreeController;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output::{self, RowStyle};
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{Group, Item, Node};
use crate::infrastructure::{CollectionStore, TomlCollectionStore};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "effective settings");

    match &cli.command {
        Some(Commands::Show {
            file,
            rows,
            collapsed,
        }) => cmd_show(file, *rows, collapsed, settings),
        Some(Commands::AddGroup {
            file,
            name,
            after_row,
            write,
        }) => cmd_add_group(file, name, *after_row, *write, settings),
        Some(Commands::AddItem {
            file,
            name,
            row,
            write,
        }) => cmd_add_item(file, name, *row, *write, settings),
        Some(Commands::Remove { file, row, write }) => cmd_remove(file, *row, *write, settings),
        Some(Commands::Move {
            file,
            row,
            down,
            write,
        }) => cmd_move(file, *row, *down, *write, settings),
        Some(Commands::Config { command }) => cmd_config(command, &settings),
        Some(Commands::Completion { shell }) => {
            generate(*shell, &mut Cli::command(), "grouptree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

/// Load `file` as original collection and start editing a copy of it.
fn open(file: &Path, settings: Settings) -> CliResult<TreeController> {
    let collection = TomlCollectionStore.load(file)?;
    let mut controller = TreeController::from_original(collection, settings);
    controller.reload();
    Ok(controller)
}

fn node_at_row(controller: &TreeController, row: usize) -> CliResult<Node> {
    controller.model().node_at_row(row).ok_or_else(|| {
        CliError::InvalidArgs(format!(
            "row {} does not exist ({} rows)",
            row,
            controller.model().row_count()
        ))
    })
}

/// Print the edited tree and persist it when requested.
fn finish(controller: &TreeController, file: &Path, write: bool) -> CliResult<()> {
    output::info(&controller.model().to_tree_string());
    if let Some(selected) = controller.selected_node() {
        output::action("selected", selected);
    }
    if write {
        TomlCollectionStore.save(file, &controller.current().borrow())?;
        output::success(&format!("saved {}", file.display()));
    } else if controller.is_modified() {
        output::warning("not saved, pass --write to keep the change");
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_show(file: &Path, rows: bool, collapsed: &[String], settings: Settings) -> CliResult<()> {
    let mut controller = open(file, settings)?;
    if !rows {
        output::info(&controller.model().to_tree_string());
        return Ok(());
    }

    let groups = controller.model().root().children()?;
    let unknown: Vec<&String> = collapsed
        .iter()
        .filter(|name| !groups.iter().any(|g| &g.name() == *name))
        .collect();
    if !unknown.is_empty() {
        output::warning(&format!("unknown groups: {}", unknown.iter().join(", ")));
    }
    for group in groups.iter().filter(|g| collapsed.contains(&g.name())) {
        controller.collapse(group)?;
    }

    output::header(&format!("{} rows", controller.model().row_count()));
    for node in controller.visible_rows() {
        let number = controller.model().row_of(&node)?;
        let style = match &node {
            Node::Item(item) if !item.borrow().enabled => RowStyle::Disabled,
            Node::Item(_) => RowStyle::Item,
            _ if controller.selected_node() == Some(&node) => RowStyle::Selected,
            _ => RowStyle::Group,
        };
        let depth = usize::from(node.is_item());
        let label = if controller.is_collapsed(&node) {
            format!("{} (+{})", node.name(), node.child_count())
        } else {
            node.name()
        };
        output::row(number, depth, &label, style);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_add_group(
    file: &Path,
    name: &str,
    after_row: Option<usize>,
    write: bool,
    settings: Settings,
) -> CliResult<()> {
    let mut controller = open(file, settings)?;
    match after_row {
        Some(row) => {
            let anchor = node_at_row(&controller, row)?;
            controller.select(&anchor);
        }
        None => controller.clear_selection(),
    }
    controller.add(Node::Group(Group::new(name).into_ref()))?;
    finish(&controller, file, write)
}

#[instrument(skip(settings))]
fn cmd_add_item(file: &Path, name: &str, row: usize, write: bool, settings: Settings) -> CliResult<()> {
    let mut controller = open(file, settings)?;
    let anchor = node_at_row(&controller, row)?;
    controller.select(&anchor);
    controller.add(Node::Item(Item::new(name).into_ref()))?;
    finish(&controller, file, write)
}

#[instrument(skip(settings))]
fn cmd_remove(file: &Path, row: usize, write: bool, settings: Settings) -> CliResult<()> {
    let mut controller = open(file, settings)?;
    let node = node_at_row(&controller, row)?;
    controller.remove(&node)?;
    finish(&controller, file, write)
}

#[instrument(skip(settings))]
fn cmd_move(file: &Path, row: usize, down: bool, write: bool, settings: Settings) -> CliResult<()> {
    let mut controller = open(file, settings)?;
    let node = node_at_row(&controller, row)?;
    if !controller.can_move_by_one_position(&node, down) {
        return Err(CliError::InvalidArgs(format!(
            "{} cannot move {}",
            node,
            if down { "down" } else { "up" }
        )));
    }
    controller.move_by_one_position(&node, down)?;
    finish(&controller, file, write)
}

fn cmd_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
