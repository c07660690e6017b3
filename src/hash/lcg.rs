//! Linear-congruential expansion of one FNV seed.
use super::PositionHasher;
use super::fnv::FnvSeed;

const LCG_MULTIPLIER: u64 = 0x5_deec_e66d;
const LCG_INCREMENT: u64 = 0xb;
const LCG_MASK: u64 = (1 << 48) - 1;
/// Replaces a seed that reduced to `i32::MAX`.
const FALLBACK_SEED: u64 = 42;

/// Positions are `(state >> 18) % m`, so only the low 2^30 bits of very
/// large arrays are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcgExpansion {
    seed: FnvSeed,
}

impl LcgExpansion {
    pub fn new(seed: FnvSeed) -> Self {
        Self { seed }
    }

    fn initial_state(&self, data: &[u8]) -> u64 {
        let reduced = self.seed.hash(data) & i32::MAX as u32;
        if reduced == i32::MAX as u32 {
            FALLBACK_SEED
        } else {
            reduced as u64
        }
    }
}

impl PositionHasher for LcgExpansion {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64> {
        let mut positions = Vec::with_capacity(hashes as usize);
        if capacity == 0 {
            return positions;
        }
        let mut state = self.initial_state(data);
        for _ in 0..hashes {
            state = state
                .wrapping_mul(LCG_MULTIPLIER)
                .wrapping_add(LCG_INCREMENT)
                & LCG_MASK;
            positions.push((state >> 18) % capacity);
        }
        positions
    }
}
