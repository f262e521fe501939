//! Node ID: a lightweight, ordered, copyable node identifier.

use serde::{Deserialize, Serialize};

/// A unique identifier for a node in the gossip topology.
///
/// A newtype around `u64` rather than a bare integer so node ids cannot be
/// confused with step indices or seeds at compile time. Ordering is plain
/// numeric ordering, which is also the neighbor order of a [`Topology`].
///
/// [`Topology`]: crate::topology::Topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node ID from a raw integer.
    #[inline]
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    /// Return the underlying integer.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}", self.0)
    }
}
