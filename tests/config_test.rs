//! Integration tests for Settings loading from files and environment

use std::fs;

use tempfile::TempDir;

use grouptree::application::ApplicationError;
use grouptree::config::Settings;

// ============================================================
// Settings::load_file()
// ============================================================

#[test]
fn given_partial_file_when_load_file_then_unspecified_switches_keep_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grouptree.toml");
    fs::write(&path, "fallback_to_first_group = false\n").unwrap();

    // Act
    let settings = Settings::load_file(&path).expect("load settings");

    // Assert
    assert!(settings.expand_new_groups);
    assert!(!settings.fallback_to_first_group);
    assert!(settings.edit_from_original);
}

#[test]
fn given_invalid_toml_when_load_file_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "expand_new_groups = maybe\n").unwrap();

    let result = Settings::load_file(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_missing_explicit_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load(Some(dir.path().join("absent.toml").as_path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

// ============================================================
// Settings::load() environment overrides
// ============================================================

/// Env vars are process-global; this is the only test in the binary touching them.
#[test]
fn given_env_var_when_load_then_env_overrides_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grouptree.toml");
    fs::write(&path, "edit_from_original = true\nexpand_new_groups = true\n").unwrap();
    std::env::set_var("GROUPTREE_EDIT_FROM_ORIGINAL", "false");

    // Act
    let settings = Settings::load(Some(path.as_path()));
    std::env::remove_var("GROUPTREE_EDIT_FROM_ORIGINAL");

    // Assert
    let settings = settings.expect("load settings");
    assert!(!settings.edit_from_original);
    assert!(settings.expand_new_groups);
}
