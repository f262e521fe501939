/// The gossip spreading rule.
///
/// One call to [`GossipStepper::step`] moves a [`GossipState`] from step
/// `s-1` to step `s`:
///
/// 1. The spreaders are the nodes informed at exactly `s-1`, in the order
///    they were informed. Older nodes never gossip again.
/// 2. Spreaders act strictly one after another. Each looks at its
///    neighbors (ascending id) that are uninformed *right now*, so a node
///    claimed by an earlier spreader in the same step is no longer a
///    candidate for a later one.
/// 3. A spreader with candidates informs exactly one of them, picked by
///    the choice source. A spreader without candidates informs no one.
///
/// Saturation is not detected here: stepping a saturated state is a no-op
/// that still advances the step counter.

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::GossipResult;
use crate::node::NodeId;
use crate::rng::ChoiceSource;
use crate::state::GossipState;
use crate::step::Step;
use crate::topology::Topology;

// ── Step report ───────────────────────────────────────────────────────

/// One spreader informing one neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transmission {
    pub from: NodeId,
    pub to: NodeId,
}

impl std::fmt::Display for Transmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// What happened during one application of the spreading rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// The step that was produced.
    pub step: Step,
    /// Successful transmissions, in spreader order.
    pub transmissions: Vec<Transmission>,
    /// Spreaders that found no uninformed neighbor.
    pub idle: Vec<NodeId>,
}

impl StepReport {
    /// Nodes informed during this step.
    pub fn newly_informed(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.transmissions.iter().map(|t| t.to)
    }

    /// Number of spreaders that acted this step (successful or not).
    pub fn spreader_count(&self) -> usize {
        self.transmissions.len() + self.idle.len()
    }
}

// ── Stepper ───────────────────────────────────────────────────────────

/// Applies the spreading rule over a fixed topology.
#[derive(Debug, Clone, Copy)]
pub struct GossipStepper<'a> {
    topology: &'a Topology,
}

impl<'a> GossipStepper<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        GossipStepper { topology }
    }

    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    /// Advance `state` by exactly one step.
    ///
    /// Any error is a broken invariant (unknown spreader, empty choice,
    /// double inform) and leaves `state` partially advanced; callers must
    /// abandon the run.
    pub fn step<R: ChoiceSource>(
        &self,
        state: &mut GossipState,
        choices: &mut R,
    ) -> GossipResult<StepReport> {
        let previous = state.step();
        let current = previous.next().unwrap_or(previous);
        state.advance_to(current);

        let spreaders = state.nodes_informed_at_step(previous);
        let mut transmissions = Vec::with_capacity(spreaders.len());
        let mut idle = Vec::new();

        for spreader in spreaders {
            // Evaluated against the live set: earlier spreaders' picks count.
            let candidates: Vec<NodeId> = self
                .topology
                .neighbors(spreader)?
                .filter(|n| !state.is_informed(*n))
                .collect();

            if candidates.is_empty() {
                trace!(node = %spreader, step = current.index(), "spreader has no uninformed neighbors");
                idle.push(spreader);
                continue;
            }

            let chosen = choices.choose(&candidates)?;
            state.mark_informed(chosen, current)?;
            debug!(
                from = %spreader,
                to = %chosen,
                step = current.index(),
                candidates = candidates.len(),
                "node informed"
            );
            transmissions.push(Transmission { from: spreader, to: chosen });
        }

        Ok(StepReport {
            step: current,
            transmissions,
            idle,
        })
    }
}
