//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/grouptree/grouptree.toml`
//! 3. Explicit config file (e.g. `--config` on the command line)
//! 4. Environment variables: `GROUPTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Behaviour switches of the tree controller.
///
/// Passed into the controller at construction; nothing reads it from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Mark newly added groups as expanded
    pub expand_new_groups: bool,
    /// Select the first group when reload cannot restore the selection
    pub fallback_to_first_group: bool,
    /// Seed the edit buffer from the original collection instead of the current one
    pub edit_from_original: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expand_new_groups: true,
            fallback_to_first_group: true,
            edit_from_original: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub expand_new_groups: Option<bool>,
    pub fallback_to_first_group: Option<bool>,
    pub edit_from_original: Option<bool>,
}

/// Get the XDG config directory for grouptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "grouptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("grouptree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            expand_new_groups: overlay.expand_new_groups.unwrap_or(self.expand_new_groups),
            fallback_to_first_group: overlay
                .fallback_to_first_group
                .unwrap_or(self.fallback_to_first_group),
            edit_from_original: overlay
                .edit_from_original
                .unwrap_or(self.edit_from_original),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Load only an explicit file on top of the defaults (no global file, no env vars).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply GROUPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("GROUPTREE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("expand_new_groups") {
            settings.expand_new_groups = val;
        }
        if let Ok(val) = config.get_bool("fallback_to_first_group") {
            settings.fallback_to_first_group = val;
        }
        if let Ok(val) = config.get_bool("edit_from_original") {
            settings.edit_from_original = val;
        }

        Ok(settings)
    }

    /// Serialize settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize: {}", e),
        })
    }

    /// Commented template for a new config file.
    pub fn template() -> String {
        r#"# grouptree configuration
# Global: ~/.config/grouptree/grouptree.toml
# Env overrides: GROUPTREE_EXPAND_NEW_GROUPS, GROUPTREE_FALLBACK_TO_FIRST_GROUP,
#                GROUPTREE_EDIT_FROM_ORIGINAL

# Expand groups right after they are added
expand_new_groups = true

# After reload, select the first group when the previous selection is gone
fallback_to_first_group = true

# Edit a pristine copy from the original collection when selecting
edit_from_original = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
