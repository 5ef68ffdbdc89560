//! Persisted mapping from module file name to the requires it declares
//!
//! Keys are bare file names (`"foo.lua"`), not paths. Two modules sharing a
//! file name in different directories collide on the same key; the scanner
//! reports such collisions instead of merging them.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{module_path::MODULE_EXTENSION, types::RequireStatement};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyIndex {
    entries: IndexMap<String, Vec<RequireStatement>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the requires of a file. Returns `false` and leaves the existing
    /// entry untouched when the key is already present.
    pub fn insert(&mut self, file_name: impl Into<String>, requires: Vec<RequireStatement>) -> bool {
        let file_name = file_name.into();
        if self.entries.contains_key(&file_name) {
            return false;
        }
        self.entries.insert(file_name, requires);
        true
    }

    /// Requires declared by the file with this bare name
    pub fn get(&self, file_name: &str) -> Option<&[RequireStatement]> {
        self.entries.get(file_name).map(Vec::as_slice)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.entries.contains_key(file_name)
    }

    /// Requires declared by module `name`, looked up as `<name>.lua`
    pub fn module_requires(&self, name: &str) -> Option<&[RequireStatement]> {
        self.get(&module_key(name))
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.contains(&module_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RequireStatement])> {
        self.entries
            .iter()
            .map(|(name, requires)| (name.as_str(), requires.as_slice()))
    }

    /// Load a persisted index. A missing or malformed file is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dependency index {}", path.display()))?;
        let index = Self::from_json_str(&content)
            .with_context(|| format!("Malformed dependency index {}", path.display()))?;
        debug!(
            "Loaded dependency index with {} entries from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Persist the index, replacing any previous file at `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_json_string()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write dependency index {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content.trim_end())?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Index key of a module name: `clusters` -> `clusters.lua`
pub fn module_key(name: &str) -> String {
    format!("{name}.{MODULE_EXTENSION}")
}
