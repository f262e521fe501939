/// Outcome space exploration engine.
///
/// Enumerates every possible run of a configuration by replacing the seeded
/// RNG with scripted choice indices and walking the tree of choices depth
/// first. Each branch is a fresh run from step 0; properties are checked on
/// the full snapshot sequence of every branch.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::GossipResult;
use crate::node::NodeId;
use crate::rng::ScriptedChoices;
use crate::simulation::Simulation;
use crate::snapshot::Snapshot;
use crate::step::Step;
use crate::topology::Topology;

// ── Property ──────────────────────────────────────────────────────────

/// A property to check against every explored branch.
pub trait Property {
    /// Name of the property (for violation reports).
    fn name(&self) -> &str;

    /// Check the property against one branch's snapshots.
    /// Returns `Ok(())` if satisfied, `Err(message)` if violated.
    fn check(&self, topology: &Topology, snapshots: &[Snapshot]) -> Result<(), String>;
}

/// Closure-backed property.
pub struct NamedProperty {
    name: String,
    check_fn: Box<dyn Fn(&Topology, &[Snapshot]) -> Result<(), String>>,
}

impl NamedProperty {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Topology, &[Snapshot]) -> Result<(), String> + 'static,
    {
        NamedProperty {
            name: name.to_string(),
            check_fn: Box::new(f),
        }
    }
}

impl Property for NamedProperty {
    fn name(&self) -> &str {
        &self.name
    }
    fn check(&self, topology: &Topology, snapshots: &[Snapshot]) -> Result<(), String> {
        (self.check_fn)(topology, snapshots)
    }
}

// ── Violation ─────────────────────────────────────────────────────────

/// A property violation found during exploration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub property: String,
    /// Branch index in exploration order.
    pub branch_id: usize,
    /// Choice indices that reproduce the branch with `ScriptedChoices`.
    pub choices: Vec<usize>,
    pub message: String,
}

// ── ExplorationResult ─────────────────────────────────────────────────

/// Final inform-step map of one branch.
pub type Outcome = BTreeMap<NodeId, Step>;

/// Summary of a completed exploration.
#[derive(Debug, Clone)]
pub struct ExplorationResult {
    pub branches_explored: usize,
    /// `false` if `max_branches` cut the search short.
    pub exhausted: bool,
    pub violations: Vec<Violation>,
    /// Distinct final outcomes across all explored branches.
    pub outcomes: BTreeSet<Outcome>,
}

impl ExplorationResult {
    /// Whether all properties held on every explored branch.
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

// ── Explorer ──────────────────────────────────────────────────────────

/// Systematically explores every choice sequence of a configuration.
pub struct Explorer {
    sim: Simulation,
    properties: Vec<Box<dyn Property>>,
    max_branches: usize,
}

impl Explorer {
    pub fn new(config: SimulationConfig) -> Self {
        Explorer {
            sim: Simulation::new(config),
            properties: Vec::new(),
            max_branches: 10_000,
        }
    }

    /// Add a property to check on every explored branch.
    pub fn add_property(&mut self, prop: Box<dyn Property>) -> &mut Self {
        self.properties.push(prop);
        self
    }

    /// Add a closure-based property.
    pub fn check<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&Topology, &[Snapshot]) -> Result<(), String> + 'static,
    {
        self.properties.push(Box::new(NamedProperty::new(name, f)));
        self
    }

    /// Set the maximum number of branches to explore (safety limit).
    pub fn set_max_branches(&mut self, max: usize) -> &mut Self {
        self.max_branches = max;
        self
    }

    /// Run the exploration.
    ///
    /// Any error in a branch is fatal to the whole exploration.
    pub fn explore(&self) -> GossipResult<ExplorationResult> {
        let mut pending: Vec<Vec<usize>> = vec![Vec::new()];
        let mut violations = Vec::new();
        let mut outcomes: BTreeSet<Outcome> = BTreeSet::new();
        let mut branch_id = 0;

        while let Some(prefix) = pending.pop() {
            if branch_id == self.max_branches {
                return Ok(ExplorationResult {
                    branches_explored: branch_id,
                    exhausted: false,
                    violations,
                    outcomes,
                });
            }

            let (snapshots, choices) = self.run_branch(prefix.clone())?;

            // Queue untried siblings of every choice made past the prefix.
            // Pushed in reverse so lower indices are explored first.
            for pos in (prefix.len()..choices.arities().len()).rev() {
                for alt in (1..choices.arities()[pos]).rev() {
                    let mut next = choices.taken()[..pos].to_vec();
                    next.push(alt);
                    pending.push(next);
                }
            }

            for prop in &self.properties {
                if let Err(message) = prop.check(self.sim.topology(), &snapshots) {
                    violations.push(Violation {
                        property: prop.name().to_string(),
                        branch_id,
                        choices: choices.taken().to_vec(),
                        message,
                    });
                }
            }

            if let Some(last) = snapshots.last() {
                outcomes.insert(
                    last.nodes
                        .iter()
                        .filter_map(|s| s.informed_at.map(|at| (s.node, at)))
                        .collect(),
                );
            }
            branch_id += 1;
        }

        debug!(
            branches = branch_id,
            outcomes = outcomes.len(),
            violations = violations.len(),
            "exploration finished"
        );
        Ok(ExplorationResult {
            branches_explored: branch_id,
            exhausted: true,
            violations,
            outcomes,
        })
    }

    fn run_branch(&self, script: Vec<usize>) -> GossipResult<(Vec<Snapshot>, ScriptedChoices)> {
        let mut stream = self.sim.snapshots_with(ScriptedChoices::new(script));
        let snapshots = stream.by_ref().collect::<GossipResult<Vec<_>>>()?;
        Ok((snapshots, stream.into_choices()))
    }
}
