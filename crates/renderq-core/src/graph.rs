//! CompatibilityGraph: the directed product/plugin compatibility graph.
//!
//! Nodes are `type:version` items carrying an `is_plugin` flag; edges point
//! from a product to a plugin it supports. The graph is populated once
//! during [`Resolver`](crate::Resolver) construction and is read-only from
//! the query side, so it can be shared across concurrent readers without
//! locking.
//!
//! Backed by a petgraph `StableGraph` plus an identifier index. The graph is
//! private; all mutation goes through `CompatibilityGraph` methods, which
//! keep node insertion idempotent by identifier and deduplicate edges.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::Directed;
use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// A node in the compatibility graph: an item identifier plus its attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemNode {
    /// The `type:version` identifier, unique within the graph.
    pub id: ItemId,
    /// Whether this item is a plugin (true) or a product (false).
    pub is_plugin: bool,
}

/// Directed compatibility graph over [`ItemNode`]s.
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    graph: StableGraph<ItemNode, (), Directed, u32>,
    /// Identifier -> graph index, the idempotency key for insertion.
    index: HashMap<ItemId, NodeIndex<u32>>,
}

impl CompatibilityGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        CompatibilityGraph {
            graph: StableGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts a node. If the identifier is already present this is a no-op:
    /// the stored `is_plugin` attribute is preserved, not overwritten.
    pub fn add_node(&mut self, id: ItemId, is_plugin: bool) {
        if self.index.contains_key(&id) {
            return;
        }
        let idx = self.graph.add_node(ItemNode {
            id: id.clone(),
            is_plugin,
        });
        self.index.insert(id, idx);
    }

    /// Inserts a directed edge. Duplicate edges collapse to one; an edge
    /// whose endpoint has not been inserted is ignored.
    pub fn add_edge(&mut self, from: &ItemId, to: &ItemId) {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return;
        };
        self.graph.update_edge(a, b, ());
    }

    /// All nodes, in unspecified order. Callers sort downstream.
    pub fn nodes(&self) -> impl Iterator<Item = &ItemNode> {
        self.graph.node_weights()
    }

    /// All directed edges as (source, target) identifier pairs, in
    /// unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = (&ItemId, &ItemId)> {
        self.graph.edge_indices().filter_map(|e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((&self.graph[a].id, &self.graph[b].id))
        })
    }

    /// Looks up a node by identifier. Callers only query identifiers already
    /// surfaced by the graph, so `None` indicates a broken precondition
    /// rather than a recoverable condition.
    pub fn node(&self, id: &ItemId) -> Option<&ItemNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ItemId {
        ItemId::parse(raw).unwrap()
    }

    #[test]
    fn add_node_is_idempotent_and_preserves_attributes() {
        let mut g = CompatibilityGraph::new();
        g.add_node(id("hou:17.5"), false);
        g.add_node(id("hou:17.5"), true);

        assert_eq!(g.node_count(), 1);
        assert!(!g.node(&id("hou:17.5")).unwrap().is_plugin);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut g = CompatibilityGraph::new();
        g.add_node(id("hou:17.5"), false);
        g.add_node(id("hou_redshift:2.6.37"), true);
        g.add_edge(&id("hou:17.5"), &id("hou_redshift:2.6.37"));
        g.add_edge(&id("hou:17.5"), &id("hou_redshift:2.6.37"));

        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn edges_are_directed() {
        let mut g = CompatibilityGraph::new();
        g.add_node(id("hou:17.5"), false);
        g.add_node(id("hou_redshift:2.6.37"), true);
        g.add_edge(&id("hou:17.5"), &id("hou_redshift:2.6.37"));

        let edges: Vec<_> = g.edges().collect();
        assert_eq!(
            edges,
            vec![(&id("hou:17.5"), &id("hou_redshift:2.6.37"))]
        );
    }

    #[test]
    fn edge_with_unknown_endpoint_is_ignored() {
        let mut g = CompatibilityGraph::new();
        g.add_node(id("hou:17.5"), false);
        g.add_edge(&id("hou:17.5"), &id("hou_redshift:2.6.37"));

        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn self_loop_is_tolerated() {
        let mut g = CompatibilityGraph::new();
        g.add_node(id("hou:17.5"), false);
        g.add_edge(&id("hou:17.5"), &id("hou:17.5"));

        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn nodes_enumerates_everything_once() {
        let mut g = CompatibilityGraph::new();
        g.add_node(id("hou:17.5"), false);
        g.add_node(id("hou:18.0"), false);
        g.add_node(id("hou_redshift:2.6.37"), true);

        let mut ids: Vec<_> = g.nodes().map(|n| n.id.as_str().to_string()).collect();
        ids.sort();
        assert_eq!(ids, ["hou:17.5", "hou:18.0", "hou_redshift:2.6.37"]);
    }

    #[test]
    fn missing_lookup_returns_none() {
        let g = CompatibilityGraph::new();
        assert!(g.node(&id("hou:17.5")).is_none());
    }
}
