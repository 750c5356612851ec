//! End-to-end tests for the command dispatch on collection files

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use grouptree::cli::args::Cli;
use grouptree::cli::commands::execute_command;
use grouptree::cli::CliError;
use grouptree::exitcode;
use grouptree::infrastructure::{CollectionStore, TomlCollectionStore};
use grouptree::util::testing;

const COLLECTION: &str = r#"
[[groups]]
name = "G0"

[[groups.items]]
name = "a"

[[groups.items]]
name = "b"

[[groups]]
name = "G1"

[[groups.items]]
name = "c"
"#;

fn setup() -> (TempDir, PathBuf) {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("collection.toml");
    fs::write(&path, COLLECTION).unwrap();
    (dir, path)
}

fn run(args: &[&str]) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(args).expect("valid arguments");
    execute_command(&cli)
}

fn layout(path: &Path) -> Vec<(String, Vec<String>)> {
    let collection = TomlCollectionStore.load(path).unwrap();
    collection
        .groups
        .iter()
        .map(|g| {
            let g = g.borrow();
            let items = g.items.iter().map(|i| i.borrow().name.clone()).collect();
            (g.name.clone(), items)
        })
        .collect()
}

fn group(name: &str, items: &[&str]) -> (String, Vec<String>) {
    (name.to_string(), items.iter().map(|i| i.to_string()).collect())
}

// ============================================================
// Editing commands
// ============================================================

#[test]
fn given_last_item_when_move_down_with_write_then_file_shows_promotion() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    run(&["grouptree", "move", file, "--row", "2", "--down", "--write"]).unwrap();

    assert_eq!(layout(&path), vec![group("G0", &["a"]), group("G1", &["b", "c"])]);
}

#[test]
fn given_item_row_when_add_item_then_inserted_after_it() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    run(&["grouptree", "add-item", file, "x", "--row", "1", "--write"]).unwrap();

    assert_eq!(layout(&path), vec![group("G0", &["a", "x", "b"]), group("G1", &["c"])]);
}

#[test]
fn given_no_anchor_when_add_group_then_appended() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    run(&["grouptree", "add-group", file, "G2", "--write"]).unwrap();

    let names: Vec<String> = layout(&path).into_iter().map(|(g, _)| g).collect();
    assert_eq!(names, vec!["G0", "G1", "G2"]);
}

#[test]
fn given_group_row_when_remove_with_write_then_group_and_items_gone() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    run(&["grouptree", "remove", file, "--row", "0", "--write"]).unwrap();

    assert_eq!(layout(&path), vec![group("G1", &["c"])]);
}

#[test]
fn given_no_write_flag_when_editing_then_file_untouched() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();
    let before = fs::read_to_string(&path).unwrap();

    run(&["grouptree", "remove", file, "--row", "1"]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn given_rows_view_with_collapse_when_show_then_succeeds() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    run(&["grouptree", "show", file, "--rows", "--collapse", "G0", "--collapse", "nope"]).unwrap();
}

// ============================================================
// Failures and exit codes
// ============================================================

#[test]
fn given_row_out_of_range_when_remove_then_usage_exit_code() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    let err = run(&["grouptree", "remove", file, "--row", "9"]).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_first_group_when_move_up_then_refused() {
    let (_dir, path) = setup();
    let file = path.to_str().unwrap();

    let err = run(&["grouptree", "move", file, "--row", "0"]).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
}

#[test]
fn given_missing_file_when_show_then_io_exit_code() {
    let (dir, _path) = setup();
    let missing = dir.path().join("absent.toml");

    let err = run(&["grouptree", "show", missing.to_str().unwrap()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::IOERR);
}

#[test]
fn given_no_command_when_executed_then_usage_error() {
    testing::init_test_setup();

    let err = run(&["grouptree"]).unwrap_err();

    assert!(matches!(err, CliError::Usage(_)));
}
