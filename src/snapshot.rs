/// Immutable per-step snapshots and the renderer hand-off.
///
/// A [`Snapshot`] is what leaves the simulation core: the step index plus,
/// for every node of the topology (ascending id), whether it is informed
/// and since when. Snapshots carry a deterministic digest so two runs can
/// be compared without diffing every field.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{GossipError, GossipResult};
use crate::node::NodeId;
use crate::state::GossipState;
use crate::step::Step;
use crate::topology::Topology;

// ── Hash utility ──────────────────────────────────────────────────────

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

/// Deterministic digest of a whole run, in snapshot order.
pub fn run_digest(snapshots: &[Snapshot]) -> u64 {
    snapshots
        .iter()
        .fold(0, |h, snap| hash_combine(h, snap.digest()))
}

// ── Snapshot ──────────────────────────────────────────────────────────

/// Per-node entry of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub node: NodeId,
    /// Step at which the node first became informed, if it has.
    pub informed_at: Option<Step>,
}

impl NodeStatus {
    pub fn is_informed(&self) -> bool {
        self.informed_at.is_some()
    }
}

/// The informed/uninformed picture of every node at one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: Step,
    /// One entry per topology node, ascending id.
    pub nodes: Vec<NodeStatus>,
}

impl Snapshot {
    /// Freeze `state` over every node of `topology`.
    pub fn capture(state: &GossipState, topology: &Topology) -> Self {
        Snapshot {
            step: state.step(),
            nodes: topology
                .nodes()
                .map(|node| NodeStatus {
                    node,
                    informed_at: state.inform_step(node),
                })
                .collect(),
        }
    }

    fn status(&self, node: NodeId) -> Option<&NodeStatus> {
        self.nodes
            .binary_search_by_key(&node, |s| s.node)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Whether `node` is informed. Fails for nodes outside the snapshot.
    pub fn is_informed(&self, node: NodeId) -> GossipResult<bool> {
        self.status(node)
            .map(NodeStatus::is_informed)
            .ok_or(GossipError::UnknownNode(node))
    }

    /// Step at which `node` was informed. Fails for nodes outside the snapshot.
    pub fn inform_step(&self, node: NodeId) -> GossipResult<Option<Step>> {
        self.status(node)
            .map(|s| s.informed_at)
            .ok_or(GossipError::UnknownNode(node))
    }

    pub fn informed_nodes(&self) -> BTreeSet<NodeId> {
        self.nodes
            .iter()
            .filter(|s| s.is_informed())
            .map(|s| s.node)
            .collect()
    }

    pub fn informed_count(&self) -> usize {
        self.nodes.iter().filter(|s| s.is_informed()).count()
    }

    /// Nodes informed at exactly this snapshot's step.
    pub fn newly_informed(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|s| s.informed_at == Some(self.step))
            .map(|s| s.node)
            .collect()
    }

    /// Every node is informed.
    pub fn is_saturated(&self) -> bool {
        self.nodes.iter().all(NodeStatus::is_informed)
    }

    /// Deterministic hash of the step and every node entry.
    pub fn digest(&self) -> u64 {
        let mut h = hash_combine(0, self.step.index());
        for s in &self.nodes {
            h = hash_combine(h, s.node.raw());
            h = hash_combine(
                h,
                s.informed_at.map_or(u64::MAX, |step| step.index()),
            );
        }
        h
    }

    /// Serialize to a compact JSON object.
    pub fn to_json(&self) -> GossipResult<String> {
        serde_json::to_string(self)
            .map_err(|e| GossipError::Serialization(e.to_string()))
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Gossip Spread: Step {}", self.step.index())?;
        for s in &self.nodes {
            match s.informed_at {
                Some(at) => writeln!(f, "  {:>4} ● informed at {}", s.node.to_string(), at)?,
                None => writeln!(f, "  {:>4} ○", s.node.to_string())?,
            }
        }
        Ok(())
    }
}

// ── Renderer ──────────────────────────────────────────────────────────

/// Consumer of the snapshot stream (frames, animation, logs, ...).
///
/// Receives the unchanging topology alongside every snapshot so it can
/// draw edges. Returning an error aborts the run.
pub trait Renderer {
    fn render(&mut self, topology: &Topology, snapshot: &Snapshot) -> GossipResult<()>;
}

/// A renderer backed by a closure, handy in tests and one-off scripts.
impl<F> Renderer for F
where
    F: FnMut(&Topology, &Snapshot) -> GossipResult<()>,
{
    fn render(&mut self, topology: &Topology, snapshot: &Snapshot) -> GossipResult<()> {
        (self)(topology, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn sample() -> (Topology, GossipState) {
        let topo = Topology::with_node_count(3, &[(0, 1), (1, 2)]).unwrap();
        let mut state = GossipState::new(n(0));
        state.mark_informed(n(1), Step::new(1)).unwrap();
        (topo, state)
    }

    #[test]
    fn test_capture_covers_every_node() {
        let (topo, state) = sample();
        let snap = Snapshot::capture(&state, &topo);

        assert_eq!(snap.step, Step::new(1));
        assert_eq!(
            snap.nodes,
            vec![
                NodeStatus { node: n(0), informed_at: Some(Step::ZERO) },
                NodeStatus { node: n(1), informed_at: Some(Step::new(1)) },
                NodeStatus { node: n(2), informed_at: None },
            ]
        );
        assert_eq!(snap.informed_count(), 2);
        assert_eq!(snap.newly_informed(), vec![n(1)]);
        assert!(!snap.is_saturated());
    }

    #[test]
    fn test_queries() {
        let (topo, state) = sample();
        let snap = Snapshot::capture(&state, &topo);

        assert!(snap.is_informed(n(1)).unwrap());
        assert!(!snap.is_informed(n(2)).unwrap());
        assert_eq!(snap.inform_step(n(0)).unwrap(), Some(Step::ZERO));
        assert_eq!(snap.is_informed(n(7)), Err(GossipError::UnknownNode(n(7))));
        assert_eq!(snap.informed_nodes(), BTreeSet::from([n(0), n(1)]));
    }

    #[test]
    fn test_digest_distinguishes_states() {
        let (topo, mut state) = sample();
        let a = Snapshot::capture(&state, &topo);
        let a_again = Snapshot::capture(&state, &topo);
        state.mark_informed(n(2), Step::new(2)).unwrap();
        let b = Snapshot::capture(&state, &topo);

        assert_eq!(a.digest(), a_again.digest());
        assert_ne!(a.digest(), b.digest());
        assert_ne!(run_digest(&[a.clone(), b.clone()]), run_digest(&[b, a]));
    }

    #[test]
    fn test_json_shape() {
        let (topo, state) = sample();
        let json = Snapshot::capture(&state, &topo).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"step":1,"nodes":[{"node":0,"informed_at":0},{"node":1,"informed_at":1},{"node":2,"informed_at":null}]}"#
        );
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.informed_count(), 2);
    }

    #[test]
    fn test_display_frame() {
        let (topo, state) = sample();
        let text = Snapshot::capture(&state, &topo).to_string();
        assert!(text.starts_with("Gossip Spread: Step 1\n"));
        assert!(text.contains("N1 ● informed at step 1"));
        assert!(text.contains("N2 ○"));
    }

    #[test]
    fn test_closure_renderer() {
        let (topo, state) = sample();
        let snap = Snapshot::capture(&state, &topo);
        let mut seen = Vec::new();
        let mut renderer = |_t: &Topology, s: &Snapshot| -> GossipResult<()> {
            seen.push(s.step);
            Ok(())
        };
        renderer.render(&topo, &snap).unwrap();
        assert_eq!(seen, vec![Step::new(1)]);
    }
}
