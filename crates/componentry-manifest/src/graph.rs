//! Module dependency graph using `petgraph`.
//!
//! Resolves the order modules are loaded in: every module comes after the
//! modules it depends on, and independent modules keep manifest order.

use componentry_common::error::{ComponentError, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// A dependency graph of modules.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    graph: DiGraph<String, ()>,
}

impl ModuleGraph {
    /// Creates an empty module graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module node. Nodes are ranked by insertion order for ties.
    pub fn add_module(&mut self, name: impl Into<String>) -> NodeIndex {
        self.graph.add_node(name.into())
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Number of modules in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph holds no module.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns module names in load order.
    ///
    /// Among the modules whose dependencies are all loaded, the one added
    /// first is loaded first.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Config`] if the dependencies are cyclic.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        if let Err(cycle) = petgraph::algo::toposort(&self.graph, None) {
            return Err(ComponentError::Config {
                message: format!(
                    "cyclic module dependency involving '{}'",
                    self.graph[cycle.node_id()]
                ),
            });
        }

        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
            .collect();
        let mut loaded = vec![false; pending.len()];
        let mut order = Vec::with_capacity(pending.len());

        while let Some(next) = self
            .graph
            .node_indices()
            .find(|idx| !loaded[idx.index()] && pending[idx.index()] == 0)
        {
            loaded[next.index()] = true;
            order.push(self.graph[next].clone());
            for dependent in self.graph.neighbors_directed(next, Direction::Outgoing) {
                pending[dependent.index()] -= 1;
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_resolves_to_empty() {
        let order = ModuleGraph::new().resolve_order().expect("resolve");
        assert!(order.is_empty());
    }

    #[test]
    fn dependencies_load_first() {
        let mut graph = ModuleGraph::new();
        let sale = graph.add_module("sale");
        let stock = graph.add_module("stock");
        graph.add_dependency(sale, stock);

        assert_eq!(graph.resolve_order().expect("resolve"), vec!["stock", "sale"]);
    }

    #[test]
    fn independent_modules_keep_insertion_order() {
        let mut graph = ModuleGraph::new();
        for name in ["x", "y", "z"] {
            let _ = graph.add_module(name);
        }
        assert_eq!(graph.resolve_order().expect("resolve"), vec!["x", "y", "z"]);
    }

    #[test]
    fn diamond_dependency() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a");
        let b = graph.add_module("b");
        let c = graph.add_module("c");
        let d = graph.add_module("d");
        graph.add_dependency(a, b);
        graph.add_dependency(a, c);
        graph.add_dependency(b, d);
        graph.add_dependency(c, d);

        assert_eq!(
            graph.resolve_order().expect("resolve"),
            vec!["d", "b", "c", "a"]
        );
    }

    #[test]
    fn repeated_dependency_counts_once() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a");
        let b = graph.add_module("b");
        graph.add_dependency(a, b);
        graph.add_dependency(a, b);

        assert_eq!(graph.resolve_order().expect("resolve"), vec!["b", "a"]);
    }

    #[test]
    fn cycle_detection() {
        let mut graph = ModuleGraph::new();
        let a = graph.add_module("a");
        let b = graph.add_module("b");
        let c = graph.add_module("c");
        graph.add_dependency(a, b);
        graph.add_dependency(b, c);
        graph.add_dependency(c, a);

        let msg = graph.resolve_order().unwrap_err().to_string();
        assert!(msg.contains("cyclic"), "got: {msg}");
    }
}
