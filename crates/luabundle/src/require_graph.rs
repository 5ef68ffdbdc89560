//! Module-level require graph used for cycle diagnostics
//!
//! Nodes are module names as they appear in the closure walk: index keys
//! without extension, and the aliases those entries require.

use indexmap::IndexMap;
use log::debug;
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

use crate::{dependency_index::DependencyIndex, module_path::MODULE_EXTENSION};

#[derive(Debug, Default)]
pub struct RequireGraph {
    graph: DiGraph<String, ()>,
    nodes: IndexMap<String, NodeIndex>,
}

impl RequireGraph {
    pub fn from_index(index: &DependencyIndex) -> Self {
        let mut graph = Self::default();
        let suffix = format!(".{MODULE_EXTENSION}");

        for (file_name, requires) in index.iter() {
            let module = file_name.strip_suffix(&suffix).unwrap_or(file_name);
            let from = graph.node(module);
            for require in requires {
                let to = graph.node(&require.alias);
                if !graph.graph.contains_edge(from, to) {
                    graph.graph.add_edge(from, to, ());
                }
            }
        }

        debug!(
            "Built require graph with {} modules and {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_owned());
        self.nodes.insert(name.to_owned(), index);
        index
    }

    /// Groups of modules that require each other, including self-requires.
    /// Members of each group are sorted by name.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| self.graph.contains_edge(node, node))
            })
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|node| self.graph[node].clone())
                    .collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }
}
