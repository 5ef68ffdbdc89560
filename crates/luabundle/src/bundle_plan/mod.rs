//! Bundle plan: which functions to pull from which files
//!
//! The plan maps each dependency file to the qualified names (as written at
//! the call site) whose definitions must be inlined. Entries only ever grow:
//! merging two plans takes the union per file.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};

pub mod builder;


pub use builder::BundlePlanBuilder;

/// The extracted-function map consumed by code generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundlePlan {
    /// Absolute file path -> qualified names to extract from it
    functions: IndexMap<PathBuf, IndexSet<String>>,

    /// Modules that took part in any dependency closure
    closure_modules: IndexSet<String>,

    /// Call-site references that name a module rather than a function,
    /// with the file that module lives in
    module_references: IndexMap<String, PathBuf>,
}

impl BundlePlan {
    /// Create a new empty bundle plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `qualified_name` from `file`
    pub fn insert(&mut self, file: PathBuf, qualified_name: String) -> bool {
        self.functions.entry(file).or_default().insert(qualified_name)
    }

    /// Request several names from `file`
    pub fn extend(&mut self, file: PathBuf, qualified_names: impl IntoIterator<Item = String>) {
        self.functions
            .entry(file)
            .or_default()
            .extend(qualified_names);
    }

    /// Union `other` into this plan
    pub fn merge(&mut self, other: Self) {
        for (file, names) in other.functions {
            self.extend(file, names);
        }
        self.closure_modules.extend(other.closure_modules);
        for (reference, file) in other.module_references {
            self.record_module_reference(reference, file);
        }
    }

    /// Note that `qualified_name` resolves to the module in `file`. The first
    /// recorded file wins.
    pub fn record_module_reference(&mut self, qualified_name: String, file: PathBuf) {
        self.module_references.entry(qualified_name).or_insert(file);
    }

    pub fn module_references(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.module_references
            .iter()
            .map(|(name, file)| (name.as_str(), file.as_path()))
    }

    pub fn record_closure_module(&mut self, module: &str) {
        if !self.closure_modules.contains(module) {
            self.closure_modules.insert(module.to_owned());
        }
    }

    pub fn closure_modules(&self) -> &IndexSet<String> {
        &self.closure_modules
    }

    /// Names requested from `file`
    pub fn functions_for(&self, file: &Path) -> Option<&IndexSet<String>> {
        self.functions.get(file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &IndexSet<String>)> {
        self.functions
            .iter()
            .map(|(file, names)| (file.as_path(), names))
    }

    pub fn file_count(&self) -> usize {
        self.functions.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.values().map(IndexSet::len).sum()
    }

    /// No function to inline. Module references alone do not count.
    pub fn is_empty(&self) -> bool {
        self.function_count() == 0
    }
}
