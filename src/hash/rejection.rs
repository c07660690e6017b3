//! Rejection sampling over a 32 bit checksum.
//!
//! The element is hashed with a salt appended, the salt advancing on every
//! attempt. Values at or above the largest multiple of `m` that fits in a
//! `u32` are thrown away so that `value % m` carries no modulo bias.
use super::PositionHasher;
use super::{adler32, crc, murmur};

/// First salt appended to the element. Odd, and advanced by one per attempt
/// whether or not the attempt is accepted.
pub const SALT_START: i32 = 89_478_583;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    Crc32,
    /// CRC32 accumulator without the final complement.
    Crc32Raw,
    Adler32,
    Murmur2,
    Murmur3,
}

impl Checksum {
    pub fn hash(self, data: &[u8]) -> u32 {
        match self {
            Checksum::Crc32 => crc::crc32(data),
            Checksum::Crc32Raw => crc::crc32_raw(data),
            Checksum::Adler32 => adler32::adler32(data),
            Checksum::Murmur2 => murmur::murmur2_32(data, 0),
            Checksum::Murmur3 => murmur::murmur3_32(data, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionSampling {
    checksum: Checksum,
}

impl RejectionSampling {
    pub fn new(checksum: Checksum) -> Self {
        Self { checksum }
    }

    pub fn checksum(&self) -> Checksum {
        self.checksum
    }
}

impl PositionHasher for RejectionSampling {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64> {
        let k = hashes as usize;
        let mut positions = Vec::with_capacity(k);
        if capacity == 0 || capacity > self.max_capacity() {
            return positions;
        }
        let limit = (u32::MAX as u64 / capacity) * capacity;

        let mut salted = Vec::with_capacity(data.len() + 4);
        salted.extend_from_slice(data);
        salted.extend_from_slice(&[0; 4]);
        let salt_at = data.len();

        let mut salt = SALT_START;
        while positions.len() < k {
            salted[salt_at..].copy_from_slice(&salt.to_le_bytes());
            salt = salt.wrapping_add(1);

            let value = self.checksum.hash(&salted) as u64;
            if value < limit {
                positions.push(value % capacity);
            }
        }
        positions
    }

    fn max_capacity(&self) -> u64 {
        u32::MAX as u64
    }
}
