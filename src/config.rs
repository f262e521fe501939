//! Run configuration.
//!
//! [`SimulationConfig`] is the validated, in-memory form the driver runs
//! from. [`ScenarioFile`] is its JSON representation; parsing it never
//! panics and maps every problem to `InvalidConfiguration`.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GossipError, GossipResult};
use crate::node::NodeId;
use crate::topology::Topology;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// Number of snapshots emitted when no budget is given.
pub const DEFAULT_TOTAL_STEPS: u64 = 6;

// ── SimulationConfig ──────────────────────────────────────────────────

/// Validated inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    topology: Topology,
    start_node: NodeId,
    seed: u64,
    total_steps: u64,
}

impl SimulationConfig {
    /// Validate and assemble a configuration.
    ///
    /// Rejects a start node outside the topology and a zero step budget.
    pub fn new(
        topology: Topology,
        start_node: NodeId,
        seed: u64,
        total_steps: u64,
    ) -> GossipResult<Self> {
        if !topology.contains(start_node) {
            return Err(GossipError::invalid_config(format!(
                "start node {} is not part of the topology",
                start_node
            )));
        }
        if total_steps == 0 {
            return Err(GossipError::invalid_config("total_steps must be positive"));
        }
        Ok(SimulationConfig {
            topology,
            start_node,
            seed,
            total_steps,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of snapshots a run emits (step 0 included).
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Same run, different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Same run, different step budget.
    pub fn with_total_steps(mut self, total_steps: u64) -> GossipResult<Self> {
        if total_steps == 0 {
            return Err(GossipError::invalid_config("total_steps must be positive"));
        }
        self.total_steps = total_steps;
        Ok(self)
    }

    /// Same run, different start node.
    pub fn with_start_node(self, start_node: NodeId) -> GossipResult<Self> {
        Self::new(self.topology, start_node, self.seed, self.total_steps)
    }
}

// ── ScenarioFile ──────────────────────────────────────────────────────

/// Node declaration: either a count (ids `0..count`) or explicit ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSet {
    Count(u64),
    Ids(Vec<u64>),
}

/// JSON scenario description.
///
/// ```json
/// { "nodes": 5, "edges": [[0,1],[0,2],[1,3],[2,4],[3,4]],
///   "start_node": 0, "seed": 42, "total_steps": 6 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub nodes: NodeSet,
    #[serde(default)]
    pub edges: Vec<(u64, u64)>,
    pub start_node: u64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_total_steps")]
    pub total_steps: u64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_total_steps() -> u64 {
    DEFAULT_TOTAL_STEPS
}

impl ScenarioFile {
    /// Parse a scenario from a JSON string.
    pub fn from_json(text: &str) -> GossipResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| GossipError::invalid_config(format!("malformed scenario: {}", e)))
    }

    /// Parse a scenario from any reader.
    pub fn from_reader<R: Read>(reader: R) -> GossipResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| GossipError::invalid_config(format!("malformed scenario: {}", e)))
    }

    /// Build the topology and validate the whole run.
    pub fn into_config(self) -> GossipResult<SimulationConfig> {
        let edges = self
            .edges
            .iter()
            .map(|&(a, b)| (NodeId::new(a), NodeId::new(b)));
        let topology = match &self.nodes {
            NodeSet::Count(count) => Topology::new((0..*count).map(NodeId::new), edges)?,
            NodeSet::Ids(ids) => Topology::new(ids.iter().copied().map(NodeId::new), edges)?,
        };
        debug!(
            nodes = topology.node_count(),
            edges = topology.edge_count(),
            declared_edges = self.edges.len(),
            "scenario topology built"
        );
        SimulationConfig::new(
            topology,
            NodeId::new(self.start_node),
            self.seed,
            self.total_steps,
        )
    }
}

impl std::str::FromStr for SimulationConfig {
    type Err = GossipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioFile::from_json(s)?.into_config()
    }
}
