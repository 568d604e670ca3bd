//! Seeded random source for arbitration draws.
//!
//! Not cryptographic. Every draw in a run traces back to the configured seed.

/// Weyl increment added to the SplitMix64 state per output.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Xor-shift / multiply rounds of the SplitMix64 output function.
const ROUNDS: [(u32, u64); 2] = [(30, 0xBF58_476D_1CE4_E5B9), (27, 0x94D0_49BB_1331_11EB)];
const FINAL_SHIFT: u32 = 31;

/// FNV-1a offset basis, used as the starting point for label folding.
const LABEL_BASIS: u64 = 0xCBF2_9CE4_8422_2325;

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform draw in `[0, 1)` built from the top 53 bits.
    fn next_f64_unit(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 * SCALE
    }

    /// Uniform draw in `[0, upper)`. Non-positive `upper` yields `0.0`.
    fn next_f64_below(&mut self, upper: f64) -> f64 {
        if upper > 0.0 {
            upper * self.next_f64_unit()
        } else {
            0.0
        }
    }
}

/// Weyl-sequence generator with the SplitMix64 output function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        mix64(self.state)
    }
}

/// Bijective 64-bit avalanche: every input bit affects every output bit.
pub fn mix64(x: u64) -> u64 {
    let z = ROUNDS
        .iter()
        .fold(x, |z, &(shift, mul)| (z ^ (z >> shift)).wrapping_mul(mul));
    z ^ (z >> FINAL_SHIFT)
}

/// Stable 64-bit key for an agent label such as `"Creature_1"`.
pub fn label_key(label: &str) -> u64 {
    let mut key = LABEL_BASIS;
    for byte in label.bytes() {
        key = mix64(key ^ u64::from(byte));
    }
    key
}

/// Seed for one agent's draws in one cycle.
///
/// Chains the inputs through `mix64` so that neighbouring cycles and agents
/// land on unrelated streams.
pub fn derive_seed(global_seed: u64, agent_key: u64, cycle: u64) -> u64 {
    [agent_key, cycle]
        .into_iter()
        .fold(mix64(global_seed), |acc, part| {
            mix64(acc.wrapping_add(GOLDEN_GAMMA) ^ part)
        })
}
