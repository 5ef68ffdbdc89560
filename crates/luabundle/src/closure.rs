//! Transitive dependency closure over the require index

use std::collections::VecDeque;

use indexmap::IndexSet;
use log::trace;
use rustc_hash::FxHashSet;

use crate::{dependency_index::DependencyIndex, references::member_name};

/// Modules reachable from a start alias, in breadth-first discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyClosure {
    modules: IndexSet<String>,
}

impl DependencyClosure {
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Empty when the start module has no index entry, i.e. it is a leaf
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Walk the index breadth-first from `start`.
///
/// A qualified start (`zcl.clusters`) is reduced to its last segment. A
/// module is part of the closure only if it has an index entry; modules
/// without one are leaves and are not expanded. Every name is enqueued at
/// most once, so cyclic requires terminate.
pub fn resolve_closure(start: &str, index: &DependencyIndex) -> DependencyClosure {
    let mut closure = DependencyClosure::default();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut queue = VecDeque::new();

    let start = member_name(start).to_owned();
    seen.insert(start.clone());
    queue.push_back(start);

    while let Some(module) = queue.pop_front() {
        let Some(requires) = index.module_requires(&module) else {
            trace!("'{module}' has no index entry, treating as leaf");
            continue;
        };

        for require in requires {
            if seen.insert(require.alias.clone()) {
                queue.push_back(require.alias.clone());
            }
        }
        closure.modules.insert(module);
    }

    closure
}
