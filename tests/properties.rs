//! Randomized invariant checks over arbitrary graphs, seeds and budgets.

use std::collections::{BTreeMap, BTreeSet};

use gossipsim::{run_digest, NodeId, Simulation, SimulationConfig, Snapshot, Step, Topology};
use proptest::prelude::*;

prop_compose! {
    fn arb_config()(node_count in 1u64..12)(
        edges in prop::collection::vec((0..node_count, 0..node_count), 0..30),
        start in 0..node_count,
        seed in any::<u64>(),
        steps in 1u64..15,
        node_count in Just(node_count),
    ) -> SimulationConfig {
        let edges: Vec<_> = edges.into_iter().filter(|(a, b)| a != b).collect();
        let topology = Topology::with_node_count(node_count, &edges).unwrap();
        SimulationConfig::new(topology, NodeId::new(start), seed, steps).unwrap()
    }
}

fn newly_at(snapshot: &Snapshot, step: Step) -> Vec<NodeId> {
    snapshot
        .nodes
        .iter()
        .filter(|s| s.informed_at == Some(step))
        .map(|s| s.node)
        .collect()
}

proptest! {
    #[test]
    fn test_runs_are_deterministic(config in arb_config()) {
        let a = Simulation::new(config.clone()).run().unwrap();
        let b = Simulation::new(config).run().unwrap();
        prop_assert_eq!(run_digest(&a), run_digest(&b));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_emits_exactly_the_budget(config in arb_config()) {
        let total = config.total_steps();
        let snaps = Simulation::new(config).run().unwrap();
        prop_assert_eq!(snaps.len() as u64, total);
        for (i, s) in snaps.iter().enumerate() {
            prop_assert_eq!(s.step, Step::new(i as u64));
        }
    }

    #[test]
    fn test_step_zero_holds_only_start(config in arb_config()) {
        let start = config.start_node();
        let snaps = Simulation::new(config).run().unwrap();
        prop_assert_eq!(snaps[0].informed_nodes(), BTreeSet::from([start]));
        prop_assert_eq!(snaps[0].inform_step(start).unwrap(), Some(Step::ZERO));
    }

    #[test]
    fn test_informed_set_is_monotonic_and_single_valued(config in arb_config()) {
        let snaps = Simulation::new(config).run().unwrap();
        let mut seen: BTreeMap<NodeId, Step> = BTreeMap::new();
        for pair in snaps.windows(2) {
            prop_assert!(pair[0].informed_nodes().is_subset(&pair[1].informed_nodes()));
        }
        for snap in &snaps {
            for status in &snap.nodes {
                if let Some(at) = status.informed_at {
                    prop_assert!(at <= snap.step);
                    let first = *seen.entry(status.node).or_insert(at);
                    prop_assert_eq!(first, at, "{} changed inform step", status.node);
                }
            }
        }
    }

    #[test]
    fn test_single_spread_bound_and_candidate_validity(config in arb_config()) {
        let topology = config.topology().clone();
        let snaps = Simulation::new(config).run().unwrap();
        for (i, snap) in snaps.iter().enumerate().skip(1) {
            let step = snap.step;
            let prev = Step::new(i as u64 - 1);
            let spreaders = newly_at(snap, prev);
            let fresh = newly_at(snap, step);

            prop_assert!(fresh.len() <= spreaders.len());
            for node in fresh {
                let reached = spreaders.iter().any(|&sp| {
                    topology.neighbors(sp).unwrap().any(|nb| nb == node)
                });
                prop_assert!(reached, "{} informed at {} without a spreading neighbor", node, step);
            }
        }
    }

    #[test]
    fn test_isolated_nodes_stay_uninformed(config in arb_config()) {
        let topology = config.topology().clone();
        let start = config.start_node();
        let snaps = Simulation::new(config).run().unwrap();
        let last = snaps.last().unwrap();
        for node in topology.nodes().filter(|&n| n != start) {
            if topology.is_isolated(node).unwrap() {
                prop_assert_eq!(last.is_informed(node), Ok(false));
            }
        }
    }
}
