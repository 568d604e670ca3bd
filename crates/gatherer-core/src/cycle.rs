use crate::rng::{self, SplitMix64};

/// Per-cycle context handed to arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleContext {
    pub cycle: u64,
    pub seed: u64,
}

impl CycleContext {
    pub fn new(cycle: u64, seed: u64) -> Self {
        Self { cycle, seed }
    }

    /// RNG stream for one agent in this cycle. Same `(seed, agent, cycle)` always yields the
    /// same stream, so a run can be replayed from its seed.
    pub fn rng_for_agent(&self, agent: &str) -> SplitMix64 {
        SplitMix64::new(rng::derive_seed(self.seed, rng::label_key(agent), self.cycle))
    }
}
