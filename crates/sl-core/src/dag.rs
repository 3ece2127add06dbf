//! Dependency graph view over a batch of migrations
//!
//! Ordering is the job of [`crate::topo`]; this graph answers neighborhood
//! questions (who depends on X, what are the heads) for maintenance flows
//! that rewrite dependency pointers.

use crate::migration_id::MigrationId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Directed graph with an edge from each dependency to its dependent
#[derive(Debug, Default)]
pub struct MigrationGraph {
    graph: DiGraph<MigrationId, ()>,
    node_map: HashMap<MigrationId, NodeIndex>,
}

impl MigrationGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a migration, returning its node
    pub fn add_migration(&mut self, id: &MigrationId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), idx);
        idx
    }

    /// Record that `dependent` depends on `dependency`
    pub fn add_dependency(&mut self, dependent: &MigrationId, dependency: &MigrationId) {
        let from = self.add_migration(dependency);
        let to = self.add_migration(dependent);
        self.graph.add_edge(from, to, ());
    }

    /// Build from `id -> dependencies`, keeping only edges between known ids
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a MigrationId, &'a [MigrationId])>,
    {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut graph = Self::new();
        for (id, _) in &entries {
            graph.add_migration(id);
        }
        for (id, deps) in &entries {
            for dep in deps.iter() {
                if graph.node_map.contains_key(dep) {
                    graph.add_dependency(id, dep);
                }
            }
        }
        graph
    }

    /// Number of migrations in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of a migration, sorted by id
    pub fn dependencies(&self, id: &str) -> Vec<MigrationId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct dependents of a migration, sorted by id
    pub fn dependents(&self, id: &str) -> Vec<MigrationId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Migrations nothing depends on, sorted by id
    pub fn heads(&self) -> Vec<MigrationId> {
        let mut heads: Vec<MigrationId> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].clone())
            .collect();
        heads.sort();
        heads
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<MigrationId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut result: Vec<MigrationId> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| match direction {
                Direction::Incoming => self.graph[e.source()].clone(),
                Direction::Outgoing => self.graph[e.target()].clone(),
            })
            .collect();
        result.sort();
        result.dedup();
        result
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
