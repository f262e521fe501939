/// Simulation driver.
///
/// Runs the spreading rule for a fixed budget of steps and emits one
/// snapshot per step, step 0 first and unchanged. The loop is purely
/// synchronous and single-threaded; every run starts from scratch with a
/// fresh choice source, so re-running reproduces the same sequence.
/// Saturation never ends a run early.

use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::GossipResult;
use crate::rng::{ChoiceSource, DeterministicRng};
use crate::snapshot::{Renderer, Snapshot};
use crate::state::GossipState;
use crate::stepper::{GossipStepper, StepReport};
use crate::topology::Topology;

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level simulation driver.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Simulation { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        self.config.topology()
    }

    /// Lazily produce the snapshots of a run seeded from the config.
    pub fn snapshots(&self) -> Snapshots<'_, DeterministicRng> {
        self.snapshots_with(DeterministicRng::new(self.config.seed()))
    }

    /// Lazily produce the snapshots of a run driven by `choices`.
    pub fn snapshots_with<R: ChoiceSource>(&self, choices: R) -> Snapshots<'_, R> {
        Snapshots {
            stepper: GossipStepper::new(self.config.topology()),
            state: GossipState::new(self.config.start_node()),
            choices,
            emitted: 0,
            total: self.config.total_steps(),
            last_report: None,
            failed: false,
        }
    }

    /// Run to completion and collect every snapshot.
    ///
    /// The first error aborts the run; no partial result is returned.
    pub fn run(&self) -> GossipResult<Vec<Snapshot>> {
        info!(
            nodes = self.topology().node_count(),
            start = %self.config.start_node(),
            seed = self.config.seed(),
            total_steps = self.config.total_steps(),
            "starting gossip run"
        );
        let snapshots = self.snapshots().collect::<GossipResult<Vec<_>>>()?;
        if let Some(last) = snapshots.last() {
            info!(
                informed = last.informed_count(),
                saturated = last.is_saturated(),
                "gossip run finished"
            );
        }
        Ok(snapshots)
    }

    /// Run to completion, handing every snapshot to `renderer` as it is
    /// produced. Returns the number of snapshots rendered.
    pub fn run_with(&self, renderer: &mut dyn Renderer) -> GossipResult<u64> {
        let mut rendered = 0;
        for snapshot in self.snapshots() {
            renderer.render(self.topology(), &snapshot?)?;
            rendered += 1;
        }
        Ok(rendered)
    }
}

// ── Snapshots iterator ────────────────────────────────────────────────

/// Lazy, finite, non-restartable snapshot stream of one run.
///
/// Yields `totalSteps` snapshots. After an error the stream is fused.
pub struct Snapshots<'a, R> {
    stepper: GossipStepper<'a>,
    state: GossipState,
    choices: R,
    emitted: u64,
    total: u64,
    last_report: Option<StepReport>,
    failed: bool,
}

impl<'a, R> Snapshots<'a, R> {
    /// The choice source, with whatever it consumed so far.
    pub fn choices(&self) -> &R {
        &self.choices
    }

    /// Consume the stream and return its choice source.
    pub fn into_choices(self) -> R {
        self.choices
    }

    /// Report of the most recent spreading step, if any.
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    /// The live state behind the last emitted snapshot.
    pub fn state(&self) -> &GossipState {
        &self.state
    }
}

impl<R: ChoiceSource> Iterator for Snapshots<'_, R> {
    type Item = GossipResult<Snapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.emitted >= self.total {
            return None;
        }
        if self.emitted > 0 {
            match self.stepper.step(&mut self.state, &mut self.choices) {
                Ok(report) => self.last_report = Some(report),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        self.emitted += 1;

        let snapshot = Snapshot::capture(&self.state, self.stepper.topology());
        debug!(
            step = snapshot.step.index(),
            informed = snapshot.informed_count(),
            "snapshot emitted"
        );
        Some(Ok(snapshot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = (self.total - self.emitted) as usize;
        (0, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GossipError;
    use crate::node::NodeId;
    use crate::rng::ScriptedChoices;
    use crate::step::Step;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn demo(seed: u64, steps: u64) -> Simulation {
        let topo =
            Topology::with_node_count(5, &[(0, 1), (0, 2), (1, 3), (2, 4), (3, 4)]).unwrap();
        Simulation::new(SimulationConfig::new(topo, n(0), seed, steps).unwrap())
    }

    #[test]
    fn test_emits_total_steps_snapshots() {
        let snaps = demo(42, 6).run().unwrap();
        assert_eq!(snaps.len(), 6);
        for (i, s) in snaps.iter().enumerate() {
            assert_eq!(s.step, Step::new(i as u64));
        }
    }

    #[test]
    fn test_step_zero_is_unchanged_initial_state() {
        let snaps = demo(42, 1).run().unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].informed_nodes().into_iter().collect::<Vec<_>>(), vec![n(0)]);
        assert_eq!(snaps[0].inform_step(n(0)).unwrap(), Some(Step::ZERO));
    }

    #[test]
    fn test_rerun_reproduces_sequence() {
        let sim = demo(2024, 8);
        assert_eq!(sim.run().unwrap(), sim.run().unwrap());
    }

    #[test]
    fn test_lazy_stream_matches_eager_run() {
        let sim = demo(9, 6);
        let lazy: Vec<Snapshot> = sim.snapshots().map(Result::unwrap).collect();
        assert_eq!(lazy, sim.run().unwrap());
    }

    #[test]
    fn test_stream_exposes_choice_consumption() {
        let sim = demo(0, 6);
        let mut stream = sim.snapshots_with(ScriptedChoices::new(vec![1]));
        for s in stream.by_ref() {
            s.unwrap();
        }
        // One pick per step 1..=4, then saturated.
        assert_eq!(stream.choices().arities(), &[2, 1, 1, 1]);
        assert!(stream.last_report().unwrap().transmissions.is_empty());
        assert_eq!(stream.state().informed_count(), 5);
    }

    #[test]
    fn test_error_aborts_and_fuses_stream() {
        let topo = Topology::with_node_count(2, &[(0, 1)]).unwrap();
        let sim = Simulation::new(SimulationConfig::new(topo, n(0), 1, 5).unwrap());

        // A source that refuses every pick.
        struct Broken;
        impl ChoiceSource for Broken {
            fn pick_index(&mut self, _len: usize) -> GossipResult<usize> {
                Err(GossipError::EmptyCandidateSet)
            }
        }

        let mut stream = sim.snapshots_with(Broken);
        assert!(stream.next().unwrap().is_ok());
        assert_eq!(stream.next().unwrap(), Err(GossipError::EmptyCandidateSet));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_run_with_renderer() {
        let sim = demo(42, 6);
        let mut frames = Vec::new();
        let rendered = sim
            .run_with(&mut |topo: &Topology, s: &Snapshot| -> GossipResult<()> {
                assert_eq!(topo.node_count(), 5);
                frames.push(s.informed_count());
                Ok(())
            })
            .unwrap();
        assert_eq!(rendered, 6);
        assert_eq!(frames, vec![1, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn test_renderer_error_aborts_run() {
        let sim = demo(42, 6);
        let mut calls = 0;
        let err = sim
            .run_with(&mut |_t: &Topology, s: &Snapshot| -> GossipResult<()> {
                calls += 1;
                if s.step == Step::new(2) {
                    Err(GossipError::Serialization("disk full".into()))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert_eq!(err, GossipError::Serialization("disk full".into()));
        assert_eq!(calls, 3);
    }
}
