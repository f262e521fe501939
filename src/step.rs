/// Discrete step index for the gossip simulation.
///
/// Step 0 is the initial snapshot (only the start node informed, no
/// spreading performed). Every later step applies the spreading rule once.
/// There is no wall-clock notion anywhere: a step is just a counter.

use serde::{Deserialize, Serialize};

/// A logical step in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step(u64);

impl Step {
    /// The initial snapshot.
    pub const ZERO: Step = Step(0);

    /// Create a step from a raw index.
    #[inline]
    pub fn new(index: u64) -> Self {
        Step(index)
    }

    /// Return the raw index.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }

    /// The step after this one.
    /// Returns `None` on overflow (should never happen in practice).
    #[inline]
    pub fn next(self) -> Option<Step> {
        self.0.checked_add(1).map(Step)
    }

    /// The step before this one, or `None` for step 0.
    #[inline]
    pub fn prev(self) -> Option<Step> {
        self.0.checked_sub(1).map(Step)
    }

    /// Returns `true` if this is the initial snapshot.
    #[inline]
    pub fn is_initial(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}", self.0)
    }
}
