/// Fluent builder DSL for simulation setup.
///
/// Hides the boilerplate of declaring nodes, wiring edges and validating
/// the run inputs while preserving full determinism.

use crate::config::{SimulationConfig, DEFAULT_SEED, DEFAULT_TOTAL_STEPS};
use crate::error::GossipResult;
use crate::node::NodeId;
use crate::simulation::Simulation;
use crate::topology::Topology;

// ── SimulationBuilder ─────────────────────────────────────────────────

/// Fluent builder for a [`Simulation`].
///
/// # Example
/// ```rust
/// use gossipsim::dsl::SimulationBuilder;
///
/// let sim = SimulationBuilder::new()
///     .nodes(5)
///     .edges([(0, 1), (0, 2), (1, 3), (2, 4), (3, 4)])
///     .start(0)
///     .seed(42)
///     .steps(6)
///     .build()
///     .unwrap();
/// assert_eq!(sim.run().unwrap().len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    nodes: Vec<NodeId>,
    edges: Vec<(NodeId, NodeId)>,
    start: NodeId,
    seed: u64,
    steps: u64,
}

impl SimulationBuilder {
    /// Create a new builder: no nodes, start N0, default seed and budget.
    pub fn new() -> Self {
        SimulationBuilder {
            nodes: Vec::new(),
            edges: Vec::new(),
            start: NodeId::new(0),
            seed: DEFAULT_SEED,
            steps: DEFAULT_TOTAL_STEPS,
        }
    }

    /// The five-node demo network: a ring 0-1-3-4-2-0, seed 42, 6 steps.
    pub fn demo() -> Self {
        Self::new()
            .nodes(5)
            .edges([(0, 1), (0, 2), (1, 3), (2, 4), (3, 4)])
    }

    // ── Nodes ─────────────────────────────────────────────────

    /// Declare nodes `0..count`.
    pub fn nodes(mut self, count: u64) -> Self {
        self.nodes.extend((0..count).map(NodeId::new));
        self
    }

    /// Declare a single node.
    pub fn node(mut self, id: u64) -> Self {
        self.nodes.push(NodeId::new(id));
        self
    }

    // ── Edges ─────────────────────────────────────────────────

    /// Connect `a` and `b` (undirected).
    pub fn edge(mut self, a: u64, b: u64) -> Self {
        self.edges.push((NodeId::new(a), NodeId::new(b)));
        self
    }

    /// Connect every pair in `pairs`.
    pub fn edges<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        self.edges
            .extend(pairs.into_iter().map(|(a, b)| (NodeId::new(a), NodeId::new(b))));
        self
    }

    // ── Run parameters ────────────────────────────────────────

    pub fn start(mut self, id: u64) -> Self {
        self.start = NodeId::new(id);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of snapshots to emit, step 0 included.
    pub fn steps(mut self, total_steps: u64) -> Self {
        self.steps = total_steps;
        self
    }

    // ── Build ─────────────────────────────────────────────────

    /// Validate and produce the configuration.
    pub fn config(self) -> GossipResult<SimulationConfig> {
        let topology = Topology::new(self.nodes, self.edges)?;
        SimulationConfig::new(topology, self.start, self.seed, self.steps)
    }

    /// Validate and produce the simulation.
    pub fn build(self) -> GossipResult<Simulation> {
        Ok(Simulation::new(self.config()?))
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
