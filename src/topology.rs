/// Static, undirected network topology.
///
/// A `Topology` is built once before a run and never mutated. It answers
/// one question for the stepper: "who are the neighbors of node N", always
/// in ascending node-id order so that candidate lists, and therefore the
/// seeded choices made over them, are reproducible.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{GossipError, GossipResult};
use crate::node::NodeId;

/// Immutable node set plus undirected adjacency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    /// Every declared node maps to its neighbor set (possibly empty).
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Topology {
    /// Build a topology from an explicit node set and an edge list.
    ///
    /// Edges are undirected; duplicates (in either orientation) are folded.
    /// Fails with `UnknownNode` if an edge references an undeclared node
    /// and with `InvalidConfiguration` for a self-loop.
    pub fn new<N, E>(nodes: N, edges: E) -> GossipResult<Self>
    where
        N: IntoIterator<Item = NodeId>,
        E: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
            nodes.into_iter().map(|n| (n, BTreeSet::new())).collect();

        for (a, b) in edges {
            if a == b {
                return Err(GossipError::invalid_config(format!(
                    "self-loop on {} is not a valid edge",
                    a
                )));
            }
            for n in [a, b] {
                if !adjacency.contains_key(&n) {
                    return Err(GossipError::UnknownNode(n));
                }
            }
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }

        Ok(Topology { adjacency })
    }

    /// Build a topology over nodes `0..count` from raw id pairs.
    pub fn with_node_count(count: u64, edges: &[(u64, u64)]) -> GossipResult<Self> {
        Self::new(
            (0..count).map(NodeId::new),
            edges.iter().map(|&(a, b)| (NodeId::new(a), NodeId::new(b))),
        )
    }

    // ── Queries ───────────────────────────────────────────────────

    /// Neighbors of `node` in ascending id order.
    pub fn neighbors(&self, node: NodeId) -> GossipResult<impl Iterator<Item = NodeId> + '_> {
        self.adjacency
            .get(&node)
            .map(|set| set.iter().copied())
            .ok_or(GossipError::UnknownNode(node))
    }

    /// Whether `node` is declared in this topology.
    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Ensure `node` is declared, failing with `UnknownNode` otherwise.
    pub fn require(&self, node: NodeId) -> GossipResult<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(GossipError::UnknownNode(node))
        }
    }

    /// Number of neighbors of `node`.
    pub fn degree(&self, node: NodeId) -> GossipResult<usize> {
        self.adjacency
            .get(&node)
            .map(BTreeSet::len)
            .ok_or(GossipError::UnknownNode(node))
    }

    /// A node with no edges can never be informed unless it is the start.
    pub fn is_isolated(&self, node: NodeId) -> GossipResult<bool> {
        Ok(self.degree(node)? == 0)
    }

    // ── Accessors ─────────────────────────────────────────────────

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Number of declared nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Distinct edges as `(low, high)` pairs, ascending.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.adjacency
            .iter()
            .flat_map(|(&a, ns)| ns.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}
