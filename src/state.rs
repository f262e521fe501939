/// Mutable record of who knows the rumor and since when.
///
/// `GossipState` is monotonic: a node, once informed, stays informed and
/// keeps the step at which it first learned. Insertion order is kept so
/// that the spreaders of a step are processed in exactly the order they
/// were informed.

use std::collections::BTreeMap;

use crate::error::{GossipError, GossipResult};
use crate::node::NodeId;
use crate::step::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GossipState {
    start: NodeId,
    /// Current step index this state reflects.
    step: Step,
    /// Single-valued: node -> step at which it was first informed.
    informed_at: BTreeMap<NodeId, Step>,
    /// Append-only insertion order of `informed_at` keys.
    order: Vec<NodeId>,
}

impl GossipState {
    /// The state at step 0: only `start` is informed.
    pub fn new(start: NodeId) -> Self {
        GossipState {
            start,
            step: Step::ZERO,
            informed_at: BTreeMap::from([(start, Step::ZERO)]),
            order: vec![start],
        }
    }

    /// The node that was seeded at step 0.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The step index this state reflects.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Move the current step forward. Earlier steps are ignored.
    pub fn advance_to(&mut self, step: Step) {
        self.step = self.step.max(step);
    }

    pub fn is_informed(&self, node: NodeId) -> bool {
        self.informed_at.contains_key(&node)
    }

    /// Step at which `node` first became informed, if it has.
    pub fn inform_step(&self, node: NodeId) -> Option<Step> {
        self.informed_at.get(&node).copied()
    }

    /// Record that `node` learned the rumor at `at`.
    ///
    /// Fails with `AlreadyInformed` if `node` is already informed; the
    /// existing record is left untouched.
    pub fn mark_informed(&mut self, node: NodeId, at: Step) -> GossipResult<()> {
        if let Some(&informed_at) = self.informed_at.get(&node) {
            return Err(GossipError::AlreadyInformed { node, informed_at });
        }
        self.informed_at.insert(node, at);
        self.order.push(node);
        self.advance_to(at);
        Ok(())
    }

    /// Nodes informed at exactly `step`, in the order they were added.
    pub fn nodes_informed_at_step(&self, step: Step) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|n| self.informed_at.get(n) == Some(&step))
            .collect()
    }

    /// All informed nodes with their inform step, in insertion order.
    pub fn informed(&self) -> impl Iterator<Item = (NodeId, Step)> + '_ {
        self.order.iter().map(move |n| (*n, self.informed_at[n]))
    }

    pub fn informed_count(&self) -> usize {
        self.order.len()
    }
}
