/// Seeded choice sources.
///
/// Every random decision in a run goes through a [`ChoiceSource`]. The
/// production source is [`DeterministicRng`], a SplitMix64 generator whose
/// output is identical for a given seed on every platform; the scripted
/// source replays fixed indices for exploration and tests.

use crate::error::{GossipError, GossipResult};

// ── ChoiceSource ──────────────────────────────────────────────────────

/// Picks one element from a non-empty, ordered candidate list.
pub trait ChoiceSource {
    /// Pick an index in `0..len`. Fails with `EmptyCandidateSet` when
    /// `len == 0`.
    fn pick_index(&mut self, len: usize) -> GossipResult<usize>;

    /// Pick one element of `candidates`.
    fn choose<T: Clone>(&mut self, candidates: &[T]) -> GossipResult<T> {
        let idx = self.pick_index(candidates.len())?;
        Ok(candidates[idx].clone())
    }
}

// ── Deterministic RNG ─────────────────────────────────────────────────

/// SplitMix64: a fast, high-quality deterministic PRNG.
///
/// `choose` consumes exactly one 64-bit draw per call (even for a single
/// candidate) and selects `candidates[draw % len]`. An empty candidate list
/// fails without consuming a draw. The modulo bias is at most `len / 2^64`.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    state: u64,
    draws: u64,
}

impl DeterministicRng {
    /// Create a new RNG from a seed.
    pub fn new(seed: u64) -> Self {
        DeterministicRng { state: seed, draws: 0 }
    }

    /// Generate the next u64.
    pub fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Number of 64-bit draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Current internal state (useful for snapshotting).
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl ChoiceSource for DeterministicRng {
    fn pick_index(&mut self, len: usize) -> GossipResult<usize> {
        if len == 0 {
            return Err(GossipError::EmptyCandidateSet);
        }
        Ok((self.next_u64() % len as u64) as usize)
    }
}

// ── Scripted choices ──────────────────────────────────────────────────

/// Replays a fixed list of choice indices, then always picks index 0.
///
/// Records the arity of every call and the index it actually returned, so
/// an explorer can enumerate sibling branches. Scripted indices are reduced
/// modulo the arity of the call they land on.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChoices {
    script: Vec<usize>,
    arities: Vec<usize>,
    taken: Vec<usize>,
}

impl ScriptedChoices {
    pub fn new(script: Vec<usize>) -> Self {
        ScriptedChoices {
            script,
            arities: Vec::new(),
            taken: Vec::new(),
        }
    }

    /// Candidate-list length seen by each call, in call order.
    pub fn arities(&self) -> &[usize] {
        &self.arities
    }

    /// Index returned by each call, in call order.
    pub fn taken(&self) -> &[usize] {
        &self.taken
    }
}

impl ChoiceSource for ScriptedChoices {
    fn pick_index(&mut self, len: usize) -> GossipResult<usize> {
        if len == 0 {
            return Err(GossipError::EmptyCandidateSet);
        }
        let call = self.taken.len();
        let idx = self.script.get(call).copied().unwrap_or(0) % len;
        self.arities.push(len);
        self.taken.push(idx);
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(42);
        let mut rng2 = DeterministicRng::new(42);

        let seq1: Vec<u64> = (0..100).map(|_| rng1.next_u64()).collect();
        let seq2: Vec<u64> = (0..100).map(|_| rng2.next_u64()).collect();

        assert_eq!(seq1, seq2, "RNG is not deterministic!");
    }

    #[test]
    fn test_splitmix_reference_vector() {
        let mut rng = DeterministicRng::new(0);
        assert_eq!(rng.next_u64(), 16294208416658607535);
        assert_eq!(rng.next_u64(), 7960286522194355700);
        assert_eq!(rng.next_u64(), 487617019471545679);

        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 13679457532755275413);
        assert_eq!(rng.next_u64(), 2949826092126892291);
    }

    #[test]
    fn test_rng_different_seeds_differ() {
        let v1 = DeterministicRng::new(1).next_u64();
        let v2 = DeterministicRng::new(2).next_u64();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_choose_pinned_sequence() {
        let mut rng = DeterministicRng::new(7);
        let picks: Vec<u32> = (0..5).map(|_| rng.choose(&[10, 20, 30]).unwrap()).collect();
        assert_eq!(picks, vec![10, 10, 10, 10, 20]);
    }

    #[test]
    fn test_choose_consumes_one_draw_per_call() {
        let mut rng = DeterministicRng::new(5);
        rng.choose(&['a']).unwrap();
        rng.choose(&['a', 'b', 'c']).unwrap();
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn test_choose_empty_fails_without_drawing() {
        let mut rng = DeterministicRng::new(5);
        let empty: [u8; 0] = [];
        assert_eq!(rng.choose(&empty), Err(GossipError::EmptyCandidateSet));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_choose_stays_in_bounds() {
        let mut rng = DeterministicRng::new(99);
        for len in 1..20usize {
            let idx = rng.pick_index(len).unwrap();
            assert!(idx < len, "index {} out of bounds for {}", idx, len);
        }
    }

    #[test]
    fn test_scripted_replays_then_defaults_to_zero() {
        let mut s = ScriptedChoices::new(vec![2, 1]);
        assert_eq!(s.choose(&["a", "b", "c"]).unwrap(), "c");
        assert_eq!(s.choose(&["a", "b"]).unwrap(), "b");
        assert_eq!(s.choose(&["a", "b"]).unwrap(), "a");
        assert_eq!(s.arities(), &[3, 2, 2]);
        assert_eq!(s.taken(), &[2, 1, 0]);
    }

    #[test]
    fn test_scripted_wraps_out_of_range_index() {
        let mut s = ScriptedChoices::new(vec![5]);
        assert_eq!(s.pick_index(2).unwrap(), 1);
    }
}
