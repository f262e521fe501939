//! Structured error types for gossipsim.
//!
//! All fallible public APIs return `Result<T, GossipError>`. Every variant
//! is fatal to the run that produced it: configuration problems are
//! reported before any stepping begins, and the remaining variants signal
//! a broken invariant inside the stepper.

use thiserror::Error;

use crate::node::NodeId;
use crate::step::Step;

/// The top-level error type for the gossip simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GossipError {
    // ── Topology errors ───────────────────────────────────

    /// A node id was referenced but is not part of the topology.
    #[error("node {0} is not part of the topology")]
    UnknownNode(NodeId),

    // ── Invariant violations ──────────────────────────────

    /// The choice source was asked to pick from zero candidates.
    #[error("cannot choose from an empty candidate set")]
    EmptyCandidateSet,

    /// Attempted to inform a node that already holds the information.
    #[error("node {node} is already informed (since {informed_at})")]
    AlreadyInformed { node: NodeId, informed_at: Step },

    // ── Config errors ─────────────────────────────────────

    /// The run was rejected before any stepping began.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ── Output errors ─────────────────────────────────────

    /// A snapshot could not be encoded for an external consumer.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GossipError {
    /// Shorthand for building an `InvalidConfiguration` from any message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        GossipError::InvalidConfiguration(msg.into())
    }
}

/// Convenience alias for `Result<T, GossipError>`.
pub type GossipResult<T> = Result<T, GossipError>;
