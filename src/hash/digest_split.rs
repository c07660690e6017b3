//! Digest splitting: carve a SHA digest into fixed-width bit chunks and keep
//! every chunk that falls below `m`. An exhausted digest is hashed again
//! (chained) until `k` positions are collected.
use super::PositionHasher;
use bitvec::prelude::*;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaDigest {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl ShaDigest {
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            ShaDigest::Sha1 => Sha1::digest(data).to_vec(),
            ShaDigest::Sha256 => Sha256::digest(data).to_vec(),
            ShaDigest::Sha384 => Sha384::digest(data).to_vec(),
            ShaDigest::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestSplitting {
    digest: ShaDigest,
}

impl DigestSplitting {
    pub fn new(digest: ShaDigest) -> Self {
        Self { digest }
    }
}

/// Bits needed to represent every value below the next power of two >= `m`.
pub fn chunk_width(capacity: u64) -> usize {
    (u64::BITS - capacity.leading_zeros()) as usize
}

impl PositionHasher for DigestSplitting {
    fn compute_positions(&self, data: &[u8], capacity: u64, hashes: u32) -> Vec<u64> {
        let k = hashes as usize;
        let mut positions = Vec::with_capacity(k);
        if capacity == 0 {
            return positions;
        }
        let width = chunk_width(capacity);

        let mut digest = self.digest.digest(data);
        loop {
            for chunk in digest.view_bits::<Lsb0>().chunks_exact(width) {
                if positions.len() == k {
                    return positions;
                }
                let value: u64 = chunk.load_le();
                if value < capacity {
                    positions.push(value);
                }
            }
            if positions.len() == k {
                return positions;
            }
            digest = self.digest.digest(&digest);
        }
    }
}
