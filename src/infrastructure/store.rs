//! TOML file format for collections
//!
//! ```toml
//! [[groups]]
//! name = "dev"
//! id = "9b2c..."          # optional, generated when missing
//!
//! [[groups.items]]
//! name = "api"
//! enabled = true          # optional, default true
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Collection, Group, Identifier, Item};
use crate::infrastructure::traits::CollectionStore;
use crate::infrastructure::{InfraError, InfraResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CollectionRecord {
    #[serde(default)]
    groups: Vec<GroupRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GroupRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Identifier>,
    name: String,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Identifier>,
    name: String,
    #[serde(default = "enabled_default")]
    enabled: bool,
}

fn enabled_default() -> bool {
    true
}

impl From<&Collection> for CollectionRecord {
    fn from(collection: &Collection) -> Self {
        Self {
            groups: collection
                .groups
                .iter()
                .map(|g| {
                    let g = g.borrow();
                    GroupRecord {
                        id: Some(g.id()),
                        name: g.name.clone(),
                        items: g
                            .items
                            .iter()
                            .map(|i| {
                                let i = i.borrow();
                                ItemRecord {
                                    id: Some(i.id()),
                                    name: i.name.clone(),
                                    enabled: i.enabled,
                                }
                            })
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

impl CollectionRecord {
    /// Builds the domain collection; duplicate identifiers are rejected.
    fn into_collection(self, path: &Path) -> InfraResult<Collection> {
        let mut seen = HashSet::new();
        let mut claim = |id: Option<Identifier>| -> InfraResult<Identifier> {
            let id = id.unwrap_or_default();
            if seen.insert(id) {
                Ok(id)
            } else {
                Err(InfraError::Format {
                    path: path.to_path_buf(),
                    message: format!("duplicate id {}", id),
                })
            }
        };

        let mut groups = Vec::with_capacity(self.groups.len());
        for record in self.groups {
            let mut group = Group::with_id(claim(record.id)?, record.name);
            for item in record.items {
                let mut entity = Item::with_id(claim(item.id)?, item.name);
                entity.enabled = item.enabled;
                group.items.push(entity.into_ref());
            }
            groups.push(group);
        }
        Ok(Collection::with_groups(groups))
    }
}

/// [`CollectionStore`] backed by TOML files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlCollectionStore;

impl TomlCollectionStore {
    pub fn parse(&self, content: &str, path: &Path) -> InfraResult<Collection> {
        let record: CollectionRecord = toml::from_str(content).map_err(|e| InfraError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        record.into_collection(path)
    }

    pub fn render(&self, collection: &Collection, path: &Path) -> InfraResult<String> {
        toml::to_string_pretty(&CollectionRecord::from(collection)).map_err(|e| {
            InfraError::Format {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })
    }
}

impl CollectionStore for TomlCollectionStore {
    fn load(&self, path: &Path) -> InfraResult<Collection> {
        debug!("load: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        self.parse(&content, path)
    }

    fn save(&self, path: &Path, collection: &Collection) -> InfraResult<()> {
        debug!("save: {}", path.display());
        let content = self.render(collection, path)?;
        std::fs::write(path, content)
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_toml_without_ids_when_parsed_then_ids_generated_and_enabled_defaults() {
        let content = r#"
[[groups]]
name = "dev"

[[groups.items]]
name = "api"

[[groups.items]]
name = "db"
enabled = false

[[groups]]
name = "prod"
"#;
        let collection = TomlCollectionStore
            .parse(content, Path::new("test.toml"))
            .unwrap();

        assert_eq!(collection.groups.len(), 2);
        let dev = collection.groups[0].borrow();
        assert_eq!(dev.name, "dev");
        assert!(dev.items[0].borrow().enabled);
        assert!(!dev.items[1].borrow().enabled);
        assert_ne!(dev.items[0].borrow().id(), dev.items[1].borrow().id());
    }

    #[test]
    fn given_duplicate_ids_when_parsed_then_format_error() {
        let content = r#"
[[groups]]
name = "a"
id = "6f1c1f1e-8c4e-4a52-9d58-0c1b2b3c4d5e"

[[groups]]
name = "b"
id = "6f1c1f1e-8c4e-4a52-9d58-0c1b2b3c4d5e"
"#;
        let result = TomlCollectionStore.parse(content, Path::new("dup.toml"));
        assert!(matches!(result, Err(InfraError::Format { .. })));
    }
}
