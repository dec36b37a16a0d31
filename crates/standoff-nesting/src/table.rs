use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::NestingError;

/// Name of an entity type, e.g. `Cell_type`.
///
/// Case-sensitive; an uppercase ASCII letter followed by letters,
/// underscores or hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Result<Self, NestingError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-');
        if valid {
            Ok(Self(name))
        } else {
            Err(NestingError::InvalidTypeName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityType {
    type Error = NestingError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-disk shape of a nesting table.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(default)]
    default: Vec<EntityType>,
    #[serde(default)]
    allow: BTreeMap<EntityType, Vec<EntityType>>,
}

/// Which types each entity type may directly contain.
///
/// Types without an entry fall back to the `default` child set. Read-only
/// once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NestingTable {
    entries: BTreeMap<EntityType, Vec<EntityType>>,
    default: Vec<EntityType>,
}

impl NestingTable {
    /// A table with no entries and the given fallback child set.
    pub fn new(default: impl IntoIterator<Item = EntityType>) -> Self {
        Self {
            entries: BTreeMap::new(),
            default: dedup(default),
        }
    }

    /// Add (or replace) the allowed children of `parent`.
    pub fn allow(mut self, parent: EntityType, children: impl IntoIterator<Item = EntityType>) -> Self {
        self.entries.insert(parent, dedup(children));
        self
    }

    /// Parse a table from TOML:
    ///
    /// ```toml
    /// default = []
    ///
    /// [allow]
    /// Cell_type = ["Tissue", "Drug_or_compound"]
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, NestingError> {
        let raw: RawTable = toml::from_str(source)?;
        let table = raw
            .allow
            .into_iter()
            .fold(Self::new(raw.default), |table, (parent, children)| {
                table.allow(parent, children)
            });
        tracing::debug!(entries = table.entries.len(), "loaded nesting table");
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NestingError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| NestingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Allowed children of `parent`, falling back to the default entry.
    pub fn allowed_children(&self, parent: &EntityType) -> &[EntityType] {
        self.entries.get(parent).unwrap_or(&self.default)
    }

    pub fn permits(&self, parent: &EntityType, child: &EntityType) -> bool {
        self.allowed_children(parent).contains(child)
    }

    pub fn default_children(&self) -> &[EntityType] {
        &self.default
    }

    pub fn has_entry(&self, parent: &EntityType) -> bool {
        self.entries.contains_key(parent)
    }
}

/// Keep first occurrences, in order.
fn dedup(types: impl IntoIterator<Item = EntityType>) -> Vec<EntityType> {
    let mut out: Vec<EntityType> = Vec::new();
    for ty in types {
        if !out.contains(&ty) {
            out.push(ty);
        }
    }
    out
}
