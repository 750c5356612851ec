//! Integration tests for TOML collection persistence

use std::fs;

use tempfile::TempDir;

use grouptree::domain::{Collection, Group};
use grouptree::infrastructure::{CollectionStore, InfraError, TomlCollectionStore};

#[test]
fn given_collection_when_saved_and_loaded_then_identity_and_fields_survive() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("collection.toml");
    let collection = Collection::with_groups(vec![
        Group::new("dev").with_items(["api", "db"]),
        Group::new("empty"),
    ]);
    collection.groups[0].borrow().items[1].borrow_mut().enabled = false;

    // Act
    TomlCollectionStore.save(&path, &collection).unwrap();
    let loaded = TomlCollectionStore.load(&path).unwrap();

    // Assert
    assert!(loaded.same_content(&collection));
    assert!(!loaded.groups[0].borrow().items[1].borrow().enabled);
}

#[test]
fn given_missing_file_when_loaded_then_io_error() {
    let dir = TempDir::new().unwrap();

    let result = TomlCollectionStore.load(&dir.path().join("absent.toml"));

    assert!(matches!(result, Err(InfraError::Io { .. })));
}

#[test]
fn given_item_without_name_when_loaded_then_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[[groups]]\nname = \"dev\"\n\n[[groups.items]]\nenabled = true\n").unwrap();

    let result = TomlCollectionStore.load(&path);

    assert!(matches!(result, Err(InfraError::Format { .. })));
}

#[test]
fn given_empty_file_when_loaded_then_empty_collection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    let loaded = TomlCollectionStore.load(&path).unwrap();

    assert!(loaded.groups.is_empty());
}
