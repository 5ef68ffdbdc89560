//! Builder that resolves a target's references into a BundlePlan

use std::path::{Path, PathBuf};

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::BundlePlan;
use crate::{
    closure::{DependencyClosure, resolve_closure},
    dependency_index::DependencyIndex,
    module_path::{module_base, module_file, resolve_module_file},
    references::{member_name, unique_references},
    sources::SourceCache,
    types::RequireStatement,
};

/// Builder for incrementally constructing a BundlePlan
#[derive(Debug)]
pub struct BundlePlanBuilder<'a> {
    /// Source tree root that dotted paths are resolved against
    root: &'a Path,
    index: &'a DependencyIndex,
    sources: &'a mut SourceCache,
    plan: BundlePlan,
}

impl<'a> BundlePlanBuilder<'a> {
    pub fn new(root: &'a Path, index: &'a DependencyIndex, sources: &'a mut SourceCache) -> Self {
        Self {
            root,
            index,
            sources,
            plan: BundlePlan::new(),
        }
    }

    /// Resolve every qualified reference the target makes through its own
    /// requires. `target_file_name` is the bare index key of the target.
    pub fn add_target(&mut self, target_file_name: &str, target_source: &str) -> &mut Self {
        let index = self.index;
        let Some(requires) = index.get(target_file_name) else {
            debug!("{target_file_name} declares no requires");
            return self;
        };

        for require in requires {
            for reference in unique_references(target_source, &require.alias) {
                self.add_reference(require, &reference);
            }
        }
        self
    }

    /// Plan a single `alias.member` reference made through `require`
    fn add_reference(&mut self, require: &RequireStatement, reference: &str) {
        let closure = resolve_closure(reference, self.index);

        if closure.is_empty() {
            // Leaf: the member is a function defined by the required module itself
            let file = module_file(&module_base(self.root, &require.path));
            trace!("{reference} resolves to leaf {}", file.display());
            self.plan.insert(file, reference.to_owned());
            return;
        }

        debug!(
            "{reference} expands to {} modules: {:?}",
            closure.len(),
            closure.modules().collect::<Vec<_>>()
        );
        // The member is itself a module: `zcl.clusters` -> `<zcl path>.clusters`
        let member_path = format!("{}.{}", require.path, member_name(reference));
        self.plan.record_module_reference(
            reference.to_owned(),
            module_file(&module_base(self.root, &member_path)),
        );
        let transmitted = self.collect_transmitted(&closure, &member_path);
        self.plan.merge(transmitted);
    }

    /// For every module in `closure`, the functions it uses from each module
    /// it requires. `start_path` is the dotted path of the closure's first
    /// module; the paths of later modules are learned from the requires that
    /// discovered them.
    fn collect_transmitted(&mut self, closure: &DependencyClosure, start_path: &str) -> BundlePlan {
        let mut collected = BundlePlan::new();
        let mut module_files: FxHashMap<String, Option<PathBuf>> = FxHashMap::default();
        if let Some(first) = closure.modules().next() {
            module_files.insert(first.to_owned(), resolve_module_file(self.root, start_path));
        }

        for module in closure.modules() {
            collected.record_closure_module(module);

            let Some(requires) = self.index.module_requires(module) else {
                continue;
            };
            let module_code = module_files
                .get(module)
                .cloned()
                .flatten()
                .and_then(|file| self.sources.load(&file));

            for require in requires {
                let required_file = resolve_module_file(self.root, &require.path);
                module_files
                    .entry(require.alias.clone())
                    .or_insert_with(|| required_file.clone());

                let Some(file) = required_file else {
                    debug!(
                        "Skipping {} required by {module}: no file for '{}'",
                        require.alias, require.path
                    );
                    continue;
                };

                // Without the requiring module's own source, fall back to the
                // required module's uses of the alias
                let references = match &module_code {
                    Some(code) => unique_references(code, &require.alias),
                    None => match self.sources.load(&file) {
                        Some(code) => unique_references(&code, &require.alias),
                        None => continue,
                    },
                };
                trace!(
                    "{module} uses {} functions of {} ({})",
                    references.len(),
                    require.alias,
                    file.display()
                );
                collected.extend(file, references);
            }
        }

        collected
    }

    /// Build the final plan
    pub fn build(self) -> BundlePlan {
        self.plan
    }
}
