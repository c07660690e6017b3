//! PRNG expansion: `k` uniform draws from a generator seeded with one FNV
//! hash. Weaker than the other strategies and kept for compatibility; only
//! the shape (one seed, `k` draws in `[0, m)`) is stable, not the stream.
use super::PositionHasher;
use super::fnv::FnvSeed;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngExpansion {
    seed: FnvSeed,
}

impl RngExpansion {
    pub fn new(seed: FnvSeed) -> Self {
        Self { seed }
    }
}

impl PositionHasher for RngExpansion {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64> {
        let mut positions = Vec::with_capacity(hashes as usize);
        if capacity == 0 {
            return positions;
        }
        let seed = self.seed.hash(data) as i32;
        let mut rng = StdRng::seed_from_u64(seed as i64 as u64);
        for _ in 0..hashes {
            positions.push(rng.random_range(0..capacity));
        }
        positions
    }
}
