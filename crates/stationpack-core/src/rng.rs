//! Randomness for trigger dispatch and tile animation.
//!
//! The engine draws random bits through [`RandomSource`] so callers decide
//! where randomness comes from. [`SimRng`] is the deterministic default:
//! SplitMix64, 8 bytes of state, trivially serializable for snapshots.

/// Source of random bits.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    fn next_u16(&mut self) -> u16 {
        self.next_u32() as u16
    }
}

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for SimRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

/// Replace the bits of `old` selected by `mask` with those of `fresh`.
pub fn apply_mask(old: u32, fresh: u32, mask: u32) -> u32 {
    (old & !mask) | (fresh & mask)
}
