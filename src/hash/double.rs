//! Kirsch-Mitzenmacher double hashing: two hash values per element and
//! `position_i = (h1 + i * h2) mod m`, regardless of `k`.
use super::PositionHasher;
use super::{crc, murmur};
use xxhash_rust::{xxh3::xxh3_128, xxh64::xxh64};

/// Where the `(h1, h2)` pair comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSource {
    /// Both halves of one 128 bit MurmurHash3.
    Murmur3x64,
    /// xxHash64, then xxHash64 again seeded with the first value.
    XxHash64,
    /// Both halves of one 128 bit XXH3.
    XxHash3,
    /// CRC-64, then the accumulator continued from the first value.
    Crc64,
}

impl PairSource {
    pub fn pair(self, data: &[u8]) -> (u64, u64) {
        match self {
            PairSource::Murmur3x64 => murmur::murmur3_x64_128(data, 0),
            PairSource::XxHash64 => {
                let h1 = xxh64(data, 0);
                (h1, xxh64(data, h1))
            }
            PairSource::XxHash3 => {
                let h = xxh3_128(data);
                (h as u64, (h >> 64) as u64)
            }
            PairSource::Crc64 => {
                let h1 = crc::crc64(data);
                (h1, crc::crc64_update(h1, data))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleHashing {
    source: PairSource,
}

impl DoubleHashing {
    pub fn new(source: PairSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> PairSource {
        self.source
    }
}

impl PositionHasher for DoubleHashing {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64> {
        let mut positions = Vec::with_capacity(hashes as usize);
        if capacity == 0 {
            return positions;
        }
        let (h1, h2) = self.source.pair(data);
        let m = capacity as u128;
        let step = h2 as u128 % m;
        let mut position = h1 as u128 % m;
        for _ in 0..hashes {
            positions.push(position as u64);
            position = (position + step) % m;
        }
        positions
    }
}
